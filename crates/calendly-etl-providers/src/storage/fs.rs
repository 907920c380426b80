//! Directory-backed object store.
//!
//! Each bucket is a subdirectory of the root; keys map to relative paths
//! beneath it. Objects are written to a temporary sibling and renamed into
//! place so readers never see a partial file.

use std::path::{Component, Path, PathBuf};

use calendly_etl_core::{EtlError, EtlResult};
use tracing::debug;

use crate::BoxFuture;

use super::ObjectStore;

/// Stores objects under `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the path for `bucket`/`key`, rejecting anything that would
    /// escape the root.
    pub fn path_for(&self, bucket: &str, key: &str) -> EtlResult<PathBuf> {
        let mut path = self.root.clone();
        for (what, value) in [("bucket", bucket), ("key", key)] {
            let relative = Path::new(value);
            if value.is_empty() {
                return Err(EtlError::storage(key, format!("{} is empty", what)));
            }
            if !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
            {
                return Err(EtlError::storage(
                    key,
                    format!("{} `{}` is not a plain relative path", what, value),
                ));
            }
            path.push(relative);
        }
        Ok(path)
    }

    async fn write(&self, bucket: &str, key: &str, body: Vec<u8>) -> EtlResult<()> {
        let path = self.path_for(bucket, key)?;
        let storage_err = |e: std::io::Error| EtlError::storage(key, e.to_string());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body).await.map_err(storage_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_err(e));
        }

        debug!(path = %path.display(), bytes = body.len(), "wrote object");
        Ok(())
    }
}

impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "fs"
    }

    fn put<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, EtlResult<()>> {
        Box::pin(self.write(bucket, key, body))
    }
}
