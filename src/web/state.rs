use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::PortalConfig,
    resources::ResourceStore,
    session::{CredentialPolicy, SessionStore},
    vault::FileVault,
};

#[derive(Clone)]
pub struct AppState {
    resources: ResourceStore,
    vault: FileVault,
    sessions: SessionStore,
    config: Arc<PortalConfig>,
}

impl AppState {
    /// Prepare the upload directory and the `resources` table, then assemble the shared state.
    pub async fn new(config: PortalConfig) -> Result<Self> {
        let vault = FileVault::new(config.upload_dir.clone());
        vault
            .ensure_root()
            .await
            .context("failed to prepare file vault")?;
        info!(upload_dir = %vault.root().display(), "file vault ready");

        let resources = ResourceStore::connect(&config.database_url)
            .await
            .context("failed to prepare resource store")?;

        Ok(Self::from_parts(resources, vault, config))
    }

    pub fn from_parts(resources: ResourceStore, vault: FileVault, config: PortalConfig) -> Self {
        Self {
            resources,
            vault,
            sessions: SessionStore::new(),
            config: Arc::new(config),
        }
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn vault(&self) -> &FileVault {
        &self.vault
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialPolicy {
        &self.config.credentials
    }
}
