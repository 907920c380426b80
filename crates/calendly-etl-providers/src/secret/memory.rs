//! In-memory secret store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use calendly_etl_core::{EtlError, EtlResult};

use crate::BoxFuture;

use super::SecretStore;

/// Map-backed store that counts lookups. Intended for tests.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a secret.
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }

    /// Number of lookups performed so far, successful or not.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn lookup<'a>(&'a self, secret_name: &'a str) -> BoxFuture<'a, EtlResult<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let result = self
            .secrets
            .get(secret_name)
            .cloned()
            .ok_or_else(|| EtlError::secret_unavailable(secret_name, "secret not found"));
        Box::pin(async move { result })
    }
}
