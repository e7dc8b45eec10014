use std::{env, path::PathBuf};

use anyhow::{Context, Result};

use crate::session::{CredentialPolicy, default_student_ranges, parse_student_ranges};

const DEFAULT_DATABASE_URL: &str = "sqlite://resources.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "txt"];
const DEFAULT_MAX_UPLOAD_MB: usize = 50;
const DEFAULT_PORT: u16 = 8080;
const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub credentials: CredentialPolicy,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let upload_dir = PathBuf::from(
            get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
        );

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got `{raw}`"))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_MB") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_MB must be a whole number, got `{raw}`"))?
                .checked_mul(BYTES_PER_MB)
                .with_context(|| format!("MAX_UPLOAD_MB is too large, got `{raw}`"))?,
            None => DEFAULT_MAX_UPLOAD_MB * BYTES_PER_MB,
        };

        let allowed_extensions = match get("ALLOWED_EXTENSIONS") {
            Some(raw) => raw
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        };

        let student_ranges = match get("STUDENT_ID_RANGES") {
            Some(raw) => parse_student_ranges(&raw).context("invalid STUDENT_ID_RANGES")?,
            None => default_student_ranges(),
        };

        let admin_username =
            get("ADMIN_USERNAME").unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
        let credentials = match get("ADMIN_PASSWORD_HASH") {
            Some(hash) => CredentialPolicy::new(admin_username, hash, student_ranges)
                .context("invalid ADMIN_PASSWORD_HASH")?,
            None => {
                let password =
                    get("ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
                CredentialPolicy::with_plain_admin_password(
                    admin_username,
                    &password,
                    student_ranges,
                )?
            }
        };

        Ok(Self {
            database_url,
            upload_dir,
            port,
            max_upload_bytes,
            allowed_extensions,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::session::Role;

    fn config_from(pairs: &[(&str, &str)]) -> Result<PortalConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PortalConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_portal_constants() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://resources.db");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_extensions, ["pdf", "docx", "pptx", "txt"]);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(
            config.credentials.authenticate("admin", "admin123"),
            Ok(Role::Admin)
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("UPLOAD_DIR", "/srv/files"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "s3cret"),
            ("STUDENT_ID_RANGES", "24A:1-3"),
            ("ALLOWED_EXTENSIONS", ".PDF, md"),
            ("PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(config.upload_dir, PathBuf::from("/srv/files"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.allowed_extensions, ["pdf", "md"]);
        assert_eq!(config.credentials.authenticate("root", "s3cret"), Ok(Role::Admin));
        assert_eq!(config.credentials.authenticate("24A02", "24A02"), Ok(Role::User));
        assert!(config.credentials.authenticate("admin", "admin123").is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("UPLOAD_DIR", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn oversized_upload_limit_is_an_error() {
        let err = config_from(&[("MAX_UPLOAD_MB", "18446744073709551615")]).unwrap_err();
        assert!(format!("{err:#}").contains("MAX_UPLOAD_MB is too large"));
    }

    #[test]
    fn upload_limit_is_scaled_to_bytes() {
        let config = config_from(&[("MAX_UPLOAD_MB", "2")]).unwrap();
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }
}
