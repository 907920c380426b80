//! `pass` (the standard unix password manager) secret store.

use calendly_etl_core::{EtlError, EtlResult};
use tokio::process::Command;

use crate::BoxFuture;

use super::SecretStore;

/// Runs `pass show <name>` and returns the whole entry.
///
/// The entry is expected to hold the JSON header object, possibly spread
/// over several lines.
#[derive(Debug, Clone)]
pub struct PassSecretStore {
    program: String,
}

impl Default for PassSecretStore {
    fn default() -> Self {
        Self {
            program: "pass".to_string(),
        }
    }
}

impl PassSecretStore {
    /// Creates a store invoking a custom executable instead of `pass`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SecretStore for PassSecretStore {
    fn name(&self) -> &str {
        "pass"
    }

    fn lookup<'a>(&'a self, secret_name: &'a str) -> BoxFuture<'a, EtlResult<String>> {
        Box::pin(async move {
            let output = Command::new(&self.program)
                .arg("show")
                .arg(secret_name)
                .output()
                .await
                .map_err(|e| {
                    EtlError::secret_unavailable(
                        secret_name,
                        format!("failed to run `{} show`: {}", self.program, e),
                    )
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(EtlError::secret_unavailable(
                    secret_name,
                    format!(
                        "`{} show` failed (exit {}): {}",
                        self.program,
                        output.status,
                        stderr.trim()
                    ),
                ));
            }

            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if stdout.is_empty() {
                return Err(EtlError::secret_unavailable(
                    secret_name,
                    format!("`{} show` produced no output", self.program),
                ));
            }
            Ok(stdout)
        })
    }
}
