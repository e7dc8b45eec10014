use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

/// Directory that holds the uploaded bytes, one file per stored name.
///
/// Names are not made unique: storing under a name that already exists
/// replaces the earlier file.
#[derive(Clone, Debug)]
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to ensure upload directory at {}", self.root.display()))
    }

    /// Where `destination_name` lands inside the vault.
    pub fn destination_for(&self, destination_name: &str) -> Result<PathBuf> {
        let sanitized = sanitize_filename::sanitize(destination_name);
        if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
            bail!("`{destination_name}` is not a usable file name");
        }
        Ok(self.root.join(sanitized))
    }

    /// Write `bytes` to `<root>/<destination_name>`, overwriting silently.
    pub async fn store(&self, bytes: &[u8], destination_name: &str) -> Result<PathBuf> {
        let path = self.destination_for(destination_name)?;

        let mut file = File::create(&path)
            .await
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("failed to flush {}", path.display()))?;

        debug!(file = %path.display(), size = bytes.len(), "stored upload");
        Ok(path)
    }

    /// Delete the file at `path`. A missing file is not an error; returns whether one was removed.
    pub async fn remove(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", path.display()))
            }
        }
    }
}
