//! Object storage.
//!
//! An [`ObjectStore`] accepts named blobs; the [`StorageSink`] encodes a
//! record table as CSV and hands it to a store under a given key.
//!
//! Backends:
//!
//! - [`FsObjectStore`] - a local directory per bucket
//! - [`MemoryObjectStore`] - in-process map, for tests

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use calendly_etl_core::{EtlError, EtlResult, encode_csv};

use crate::BoxFuture;

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

/// Sink for named blobs.
pub trait ObjectStore: Send + Sync {
    /// Returns a short name for this backend, used in logs.
    fn name(&self) -> &str;

    /// Writes `body` to `key` in `bucket`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::StorageFailed`] if the write fails.
    fn put<'a>(&'a self, bucket: &'a str, key: &'a str, body: Vec<u8>)
    -> BoxFuture<'a, EtlResult<()>>;
}

/// Result of [`StorageSink::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The table was written.
    Uploaded {
        key: String,
        rows: usize,
        bytes: usize,
    },
    /// The table was empty; nothing was written.
    Skipped,
}

impl UploadOutcome {
    /// Returns true if an object was written.
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// Writes record tables as CSV objects into one bucket.
#[derive(Clone)]
pub struct StorageSink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl StorageSink {
    /// Creates a sink writing to `bucket` through `store`.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Returns the destination bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Encodes `records` as CSV and writes them to `key`.
    ///
    /// An empty table is not written and yields [`UploadOutcome::Skipped`].
    pub async fn upload<T: Serialize>(&self, records: &[T], key: &str) -> EtlResult<UploadOutcome> {
        if records.is_empty() {
            info!(key, "no data to upload");
            return Ok(UploadOutcome::Skipped);
        }

        let body = encode_csv(records)
            .map_err(|e| EtlError::storage(key, format!("failed to encode CSV: {}", e)))?;
        let bytes = body.len();

        self.store.put(&self.bucket, key, body).await?;

        info!(
            store = self.store.name(),
            bucket = %self.bucket,
            key,
            rows = records.len(),
            bytes,
            "uploaded table"
        );
        Ok(UploadOutcome::Uploaded {
            key: key.to_string(),
            rows: records.len(),
            bytes,
        })
    }
}

impl std::fmt::Debug for StorageSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSink")
            .field("store", &self.store.name())
            .field("bucket", &self.bucket)
            .finish()
    }
}
