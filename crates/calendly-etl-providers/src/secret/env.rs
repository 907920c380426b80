//! Environment-variable secret store.

use calendly_etl_core::{EtlError, EtlResult};

use crate::BoxFuture;

use super::SecretStore;

/// Reads secrets from `<prefix><NAME>` environment variables.
///
/// `NAME` is the secret name upper-cased with every non-alphanumeric
/// character replaced by `_`, so `calendly` maps to
/// `CALENDLY_ETL_SECRET_CALENDLY` and `prod/calendly` to
/// `CALENDLY_ETL_SECRET_PROD_CALENDLY`.
#[derive(Debug, Clone)]
pub struct EnvSecretStore {
    prefix: String,
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX)
    }
}

impl EnvSecretStore {
    /// Default variable prefix.
    pub const DEFAULT_PREFIX: &'static str = "CALENDLY_ETL_SECRET_";

    /// Creates a store with a custom variable prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the variable name consulted for `secret_name`.
    pub fn variable_for(&self, secret_name: &str) -> String {
        let suffix: String = secret_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn lookup<'a>(&'a self, secret_name: &'a str) -> BoxFuture<'a, EtlResult<String>> {
        let var = self.variable_for(secret_name);
        Box::pin(async move {
            std::env::var(&var).map_err(|_| {
                EtlError::secret_unavailable(
                    secret_name,
                    format!("environment variable `{}` is not set", var),
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names() {
        let store = EnvSecretStore::default();
        assert_eq!(store.variable_for("calendly"), "CALENDLY_ETL_SECRET_CALENDLY");
        assert_eq!(
            store.variable_for("prod/calendly-api"),
            "CALENDLY_ETL_SECRET_PROD_CALENDLY_API"
        );
        assert_eq!(EnvSecretStore::new("X_").variable_for("a.b"), "X_A_B");
    }

    #[tokio::test]
    async fn reads_variable() {
        let store = EnvSecretStore::new("_CALENDLY_ETL_TEST_ENV_STORE_");
        unsafe {
            std::env::set_var("_CALENDLY_ETL_TEST_ENV_STORE_PRESENT", "{\"a\":\"b\"}");
        }
        assert_eq!(store.lookup("present").await.unwrap(), "{\"a\":\"b\"}");
        unsafe {
            std::env::remove_var("_CALENDLY_ETL_TEST_ENV_STORE_PRESENT");
        }
    }

    #[tokio::test]
    async fn missing_variable_errors() {
        let store = EnvSecretStore::new("_CALENDLY_ETL_TEST_ENV_STORE_");
        let err = store.lookup("nonexistent-12345").await.unwrap_err();
        assert!(err.to_string().contains("not set"));
    }
}
