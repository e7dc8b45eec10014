use std::{fmt, str::FromStr};

use anyhow::{Context, Result, anyhow, bail};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;

use super::Role;

/// Number of digits that follow a student identifier prefix.
const STUDENT_SUFFIX_DIGITS: usize = 2;

/// Reason a login attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    MissingCredentials,
    InvalidCredentials,
    /// The identifier is a valid student roll number but the secret is wrong.
    InvalidPassword,
    AlreadySignedIn,
}

impl LoginError {
    /// Flash code carried back to the login page.
    pub fn code(&self) -> &'static str {
        match self {
            LoginError::MissingCredentials => "missing_credentials",
            LoginError::InvalidCredentials => "invalid_credentials",
            LoginError::InvalidPassword => "invalid_password",
            LoginError::AlreadySignedIn => "already_signed_in",
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            LoginError::MissingCredentials => "Please enter both a username and a password.",
            LoginError::InvalidCredentials => "Invalid credentials!",
            LoginError::InvalidPassword => "Invalid password!",
            LoginError::AlreadySignedIn => "You are already signed in.",
        };
        f.write_str(message)
    }
}

impl std::error::Error for LoginError {}

/// A roll-number block: `prefix` followed by two digits inside `min..=max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdRange {
    prefix: String,
    min: u32,
    max: u32,
}

impl StudentIdRange {
    pub fn new(prefix: impl Into<String>, min: u32, max: u32) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            bail!("student id prefix must not be empty");
        }
        if min > max {
            bail!("student id range `{prefix}` has min {min} above max {max}");
        }
        Ok(Self { prefix, min, max })
    }

    pub fn matches(&self, identifier: &str) -> bool {
        let Some(suffix) = identifier.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if suffix.len() != STUDENT_SUFFIX_DIGITS || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        suffix
            .parse::<u32>()
            .map(|number| (self.min..=self.max).contains(&number))
            .unwrap_or(false)
    }
}

impl FromStr for StudentIdRange {
    type Err = anyhow::Error;

    /// Parses `PREFIX:MIN-MAX`, e.g. `22F01A42:1-66`.
    fn from_str(raw: &str) -> Result<Self> {
        let (prefix, bounds) = raw
            .trim()
            .split_once(':')
            .ok_or_else(|| anyhow!("student id range `{raw}` must look like PREFIX:MIN-MAX"))?;
        let (min, max) = bounds
            .split_once('-')
            .ok_or_else(|| anyhow!("student id range `{raw}` is missing a `-` between bounds"))?;

        let min = min
            .trim()
            .parse()
            .with_context(|| format!("invalid lower bound in student id range `{raw}`"))?;
        let max = max
            .trim()
            .parse()
            .with_context(|| format!("invalid upper bound in student id range `{raw}`"))?;

        Self::new(prefix.trim(), min, max)
    }
}

pub fn parse_student_ranges(raw: &str) -> Result<Vec<StudentIdRange>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(StudentIdRange::from_str)
        .collect()
}

pub fn default_student_ranges() -> Vec<StudentIdRange> {
    vec![
        StudentIdRange {
            prefix: "22F01A42".to_string(),
            min: 1,
            max: 66,
        },
        StudentIdRange {
            prefix: "23F05A42".to_string(),
            min: 1,
            max: 7,
        },
    ]
}

/// Who may sign in, and as what.
#[derive(Clone)]
pub struct CredentialPolicy {
    admin_username: String,
    admin_password_hash: String,
    student_ranges: Vec<StudentIdRange>,
}

impl fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPolicy")
            .field("admin_username", &self.admin_username)
            .field("student_ranges", &self.student_ranges)
            .finish_non_exhaustive()
    }
}

impl CredentialPolicy {
    pub fn new(
        admin_username: impl Into<String>,
        admin_password_hash: impl Into<String>,
        student_ranges: Vec<StudentIdRange>,
    ) -> Result<Self> {
        let admin_password_hash = admin_password_hash.into();
        PasswordHash::new(&admin_password_hash)
            .map_err(|err| anyhow!("admin password hash is not a valid PHC string: {err}"))?;

        Ok(Self {
            admin_username: admin_username.into(),
            admin_password_hash,
            student_ranges,
        })
    }

    pub fn with_plain_admin_password(
        admin_username: impl Into<String>,
        admin_password: &str,
        student_ranges: Vec<StudentIdRange>,
    ) -> Result<Self> {
        let hash = hash_password(admin_password)
            .map_err(|err| anyhow!("failed to hash admin password: {err}"))?;
        Self::new(admin_username, hash, student_ranges)
    }

    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    pub fn student_ranges(&self) -> &[StudentIdRange] {
        &self.student_ranges
    }

    pub fn is_student_identifier(&self, identifier: &str) -> bool {
        self.student_ranges
            .iter()
            .any(|range| range.matches(identifier))
    }

    /// Decide which role, if any, an identifier/secret pair earns.
    ///
    /// The administrator pair is checked first. A student identifier only
    /// authenticates when the secret is the identifier itself.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Result<Role, LoginError> {
        if identifier.is_empty() || secret.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        if identifier == self.admin_username && verify_password(secret, &self.admin_password_hash)
        {
            return Ok(Role::Admin);
        }

        if self.is_student_identifier(identifier) {
            if secret == identifier {
                return Ok(Role::User);
            }
            return Err(LoginError::InvalidPassword);
        }

        Err(LoginError::InvalidCredentials)
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}
