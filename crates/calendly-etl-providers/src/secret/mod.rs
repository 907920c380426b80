//! Credential resolution.
//!
//! A [`SecretStore`] turns a secret name into its raw string value. The
//! [`CredentialProvider`] parses that value as a JSON object of HTTP header
//! names to values, producing the [`CredentialBundle`] attached to every
//! API request of a run.
//!
//! Backends:
//!
//! - [`EnvSecretStore`] - `CALENDLY_ETL_SECRET_<NAME>` environment variables
//! - [`FileSecretStore`] - `<dir>/<name>.json`
//! - [`PassSecretStore`] - `pass show <name>`
//! - [`MemorySecretStore`] - in-process map, for tests

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use calendly_etl_core::{EtlError, EtlResult};
use tracing::{error, info};

use crate::BoxFuture;

mod env;
mod file;
mod memory;
mod pass;

pub use env::EnvSecretStore;
pub use file::FileSecretStore;
pub use memory::MemorySecretStore;
pub use pass::PassSecretStore;

/// Key-value lookup of secrets by name.
pub trait SecretStore: Send + Sync {
    /// Returns a short name for this backend, used in logs.
    fn name(&self) -> &str;

    /// Returns the raw value stored under `secret_name`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::SecretUnavailable`] when the secret does not exist
    /// or cannot be read.
    fn lookup<'a>(&'a self, secret_name: &'a str) -> BoxFuture<'a, EtlResult<String>>;
}

/// HTTP headers that authenticate API requests.
///
/// `Debug` never prints header values.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    headers: BTreeMap<String, String>,
}

impl CredentialBundle {
    /// Creates a bundle from header pairs.
    pub fn new<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses a secret value holding a JSON object of string values.
    pub fn from_json(secret_name: &str, raw: &str) -> EtlResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            EtlError::secret_unavailable(secret_name, format!("value is not valid JSON: {}", e))
        })?;

        let serde_json::Value::Object(map) = value else {
            return Err(EtlError::secret_unavailable(
                secret_name,
                "value is not a JSON object",
            ));
        };

        let mut headers = BTreeMap::new();
        for (key, value) in map {
            match value {
                serde_json::Value::String(s) => {
                    headers.insert(key, s);
                }
                _ => {
                    return Err(EtlError::secret_unavailable(
                        secret_name,
                        format!("header `{}` is not a string", key),
                    ));
                }
            }
        }

        Ok(Self { headers })
    }

    /// Iterates over header name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the value of a header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if the bundle holds no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves the credential bundle for a run from a named secret.
#[derive(Clone)]
pub struct CredentialProvider {
    store: Arc<dyn SecretStore>,
    secret_name: String,
}

impl CredentialProvider {
    /// Creates a provider reading `secret_name` from `store`.
    pub fn new(store: Arc<dyn SecretStore>, secret_name: impl Into<String>) -> Self {
        Self {
            store,
            secret_name: secret_name.into(),
        }
    }

    /// Returns the configured secret name.
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Looks up and parses the credential bundle. Not retried.
    pub async fn get_credentials(&self) -> EtlResult<CredentialBundle> {
        let result = match self.store.lookup(&self.secret_name).await {
            Ok(raw) => CredentialBundle::from_json(&self.secret_name, &raw),
            Err(e) => Err(e),
        };

        match result {
            Ok(bundle) => {
                info!(
                    secret = %self.secret_name,
                    store = self.store.name(),
                    headers = bundle.len(),
                    "resolved API credentials"
                );
                Ok(bundle)
            }
            Err(e) => {
                error!(secret = %self.secret_name, store = self.store.name(), "error retrieving secret: {}", e);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("store", &self.store.name())
            .field("secret_name", &self.secret_name)
            .finish()
    }
}
