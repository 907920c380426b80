//! File-backed secret store.

use std::path::{Path, PathBuf};

use calendly_etl_core::{EtlError, EtlResult};

use crate::BoxFuture;

use super::SecretStore;

/// Reads secrets from `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory secrets are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file consulted for `secret_name`.
    ///
    /// Names containing path separators or `..` are rejected.
    pub fn path_for(&self, secret_name: &str) -> Option<PathBuf> {
        if secret_name.is_empty()
            || secret_name.contains(['/', '\\'])
            || secret_name.contains("..")
        {
            return None;
        }
        Some(self.dir.join(format!("{}.json", secret_name)))
    }
}

impl SecretStore for FileSecretStore {
    fn name(&self) -> &str {
        "file"
    }

    fn lookup<'a>(&'a self, secret_name: &'a str) -> BoxFuture<'a, EtlResult<String>> {
        Box::pin(async move {
            let path = self.path_for(secret_name).ok_or_else(|| {
                EtlError::secret_unavailable(secret_name, "secret name is not a plain file name")
            })?;

            tokio::fs::read_to_string(&path).await.map_err(|e| {
                EtlError::secret_unavailable(
                    secret_name,
                    format!("failed to read {}: {}", path.display(), e),
                )
            })
        })
    }
}
