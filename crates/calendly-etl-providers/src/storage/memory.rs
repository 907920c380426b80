//! In-memory object store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use calendly_etl_core::{EtlError, EtlResult};

use crate::BoxFuture;

use super::ObjectStore;

/// Map-backed store keyed by `(bucket, key)`. Intended for tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    puts: Mutex<usize>,
    fail_after: Option<usize>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every put after the first `successful` ones fail.
    pub fn fail_after(mut self, successful: usize) -> Self {
        self.fail_after = Some(successful);
        self
    }

    /// Returns the object stored at `bucket`/`key`.
    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Returns the keys stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Number of put attempts, successful or not.
    pub fn put_count(&self) -> usize {
        *self.puts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn put<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, EtlResult<()>> {
        let result = {
            let mut puts = self.puts.lock().unwrap_or_else(|e| e.into_inner());
            let attempt = *puts;
            *puts += 1;

            if self.fail_after.is_some_and(|limit| attempt >= limit) {
                Err(EtlError::storage(key, "injected failure"))
            } else {
                self.objects
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert((bucket.to_string(), key.to_string()), body);
                Ok(())
            }
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryObjectStore::new();
        store.put("b", "k", b"one".to_vec()).await.unwrap();
        store.put("b", "k", b"two".to_vec()).await.unwrap();
        assert_eq!(store.get("b", "k"), Some(b"two".to_vec()));
        assert_eq!(store.keys("b"), vec!["k".to_string()]);
        assert!(store.keys("other").is_empty());
    }

    #[tokio::test]
    async fn fail_after_limit() {
        let store = MemoryObjectStore::new().fail_after(1);
        store.put("b", "first", Vec::new()).await.unwrap();
        assert!(store.put("b", "second", Vec::new()).await.is_err());
        assert_eq!(store.keys("b"), vec!["first".to_string()]);
        assert_eq!(store.put_count(), 2);
    }
}
