//! Error types for tracing backend operations.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur while querying the tracing backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Tracing integration switched off in configuration.
    #[error("tracing is not enabled")]
    Disabled,

    /// A caller-supplied value the backend cannot use.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The requested entity does not exist in the backend.
    #[error("{0} not found")]
    NotFound(String),

    /// Backend could not be reached.
    #[error("tracing backend unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer within the configured timeout.
    #[error("tracing backend timeout after {0} seconds")]
    Timeout(u64),

    /// Backend answered with a non-success status.
    #[error("tracing backend returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Backend answered with a body that could not be decoded.
    #[error("failed to decode tracing backend response: {0}")]
    Decode(String),
}

/// A backend error together with the status the backend client assigned to it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct StatusError {
    pub status: StatusCode,
    #[source]
    pub error: BackendError,
}

impl StatusError {
    pub fn new(status: StatusCode, error: BackendError) -> Self {
        Self { status, error }
    }
}

/// A successful backend answer and the status to report with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub payload: T,
    pub status: StatusCode,
}

impl<T> Reply<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            payload,
            status: StatusCode::OK,
        }
    }
}

/// Result of operations where the backend client classifies the status itself.
pub type StatusResult<T> = Result<Reply<T>, StatusError>;

/// Result of operations that only report an opaque error.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::Timeout(10);
        assert_eq!(err.to_string(), "tracing backend timeout after 10 seconds");

        let err = BackendError::InvalidParameter {
            name: "startMicros",
            reason: "not a number".into(),
        };
        assert_eq!(err.to_string(), "invalid parameter startMicros: not a number");
    }

    #[test]
    fn test_status_error_displays_inner_message() {
        let err = StatusError::new(StatusCode::NOT_FOUND, BackendError::NotFound("trace abc".into()));
        assert_eq!(err.to_string(), "trace abc not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
