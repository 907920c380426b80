//! Error types for an extraction run.
//!
//! Every component of the pipeline reports failures through [`EtlError`].
//! Nothing is retried: errors travel up with `?` to the entry point, which
//! is the only place they are turned into a failure response.

use std::fmt;
use thiserror::Error;

/// The category of an [`EtlError`].
///
/// Callers match on the code rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The secret store has no such secret, or its value is not a header map.
    SecretUnavailable,
    /// The scheduling API answered with a non-success status.
    ApiRequestFailed,
    /// The scheduling API could not be reached (connect, DNS, TLS, body read).
    ApiUnavailable,
    /// The scheduling API answered with a body we could not interpret.
    InvalidResponse,
    /// Timestamps in the extract could not be turned into durations.
    MetricsComputationFailed,
    /// Writing an object to storage failed.
    StorageFailed,
    /// Missing or invalid configuration.
    ConfigurationError,
}

impl ErrorCode {
    /// Returns a stable machine-readable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretUnavailable => "secret_unavailable",
            Self::ApiRequestFailed => "api_request_failed",
            Self::ApiUnavailable => "api_unavailable",
            Self::InvalidResponse => "invalid_response",
            Self::MetricsComputationFailed => "metrics_computation_failed",
            Self::StorageFailed => "storage_failed",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while extracting, aggregating or persisting data.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Secret lookup or parsing failed.
    #[error("secret `{name}` unavailable: {reason}")]
    SecretUnavailable { name: String, reason: String },

    /// Non-2xx response from the scheduling API.
    #[error("API request to {url} failed with status {status}: {body}")]
    ApiRequestFailed {
        url: String,
        status: u16,
        body: String,
    },

    /// Transport-level failure talking to the scheduling API.
    #[error("API unavailable at {url}: {reason}")]
    ApiUnavailable { url: String, reason: String },

    /// The API responded successfully but the payload was unusable.
    #[error("invalid API response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// Malformed data prevented metric computation.
    #[error("metrics computation failed: {reason}")]
    MetricsComputationFailed { reason: String },

    /// Object storage rejected a write.
    #[error("storage write to `{key}` failed: {reason}")]
    StorageFailed { key: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl EtlError {
    /// Creates a secret unavailable error.
    pub fn secret_unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an API request failure for a non-success status.
    pub fn api_request_failed(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates an API unavailable error.
    pub fn api_unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ApiUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a metrics computation error.
    pub fn metrics(reason: impl Into<String>) -> Self {
        Self::MetricsComputationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SecretUnavailable { .. } => ErrorCode::SecretUnavailable,
            Self::ApiRequestFailed { .. } => ErrorCode::ApiRequestFailed,
            Self::ApiUnavailable { .. } => ErrorCode::ApiUnavailable,
            Self::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            Self::MetricsComputationFailed { .. } => ErrorCode::MetricsComputationFailed,
            Self::StorageFailed { .. } => ErrorCode::StorageFailed,
            Self::Config { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Returns the HTTP status for API request failures.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized Result type for extraction runs.
pub type EtlResult<T> = Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(ErrorCode::SecretUnavailable.as_str(), "secret_unavailable");
        assert_eq!(ErrorCode::ApiRequestFailed.as_str(), "api_request_failed");
        assert_eq!(
            ErrorCode::MetricsComputationFailed.to_string(),
            "metrics_computation_failed"
        );
    }

    #[test]
    fn constructors_map_to_codes() {
        assert_eq!(
            EtlError::secret_unavailable("calendly", "missing").code(),
            ErrorCode::SecretUnavailable
        );
        assert_eq!(
            EtlError::api_unavailable("https://x", "dns").code(),
            ErrorCode::ApiUnavailable
        );
        assert_eq!(
            EtlError::invalid_response("https://x", "not json").code(),
            ErrorCode::InvalidResponse
        );
        assert_eq!(EtlError::metrics("bad").code(), ErrorCode::MetricsComputationFailed);
        assert_eq!(EtlError::storage("k", "disk").code(), ErrorCode::StorageFailed);
        assert_eq!(EtlError::config("nope").code(), ErrorCode::ConfigurationError);
    }

    #[test]
    fn api_request_failed_carries_status_and_body() {
        let err = EtlError::api_request_failed("https://api.calendly.com/users/me", 401, "denied");
        assert_eq!(err.code(), ErrorCode::ApiRequestFailed);
        assert_eq!(err.http_status(), Some(401));

        let display = err.to_string();
        assert!(display.contains("users/me"));
        assert!(display.contains("401"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn secret_error_display_names_secret() {
        let err = EtlError::secret_unavailable("calendly", "not found");
        assert_eq!(err.to_string(), "secret `calendly` unavailable: not found");
        assert_eq!(err.http_status(), None);
    }
}
