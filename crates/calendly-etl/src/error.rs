//! CLI error types.
//!
//! These cover failures that happen before a run starts. Failures during a
//! run are [`EtlError`]s and are turned into an invocation response by
//! [`crate::handler::handle`].

use calendly_etl_core::{EtlError, TracingError};
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while setting up or reporting a run.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The trigger payload is not valid JSON.
    #[error("invalid payload: {0}")]
    Payload(String),

    /// Logging could not be initialized.
    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// Building the pipeline failed.
    #[error(transparent)]
    Etl(#[from] EtlError),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
