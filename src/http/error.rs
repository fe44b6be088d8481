//! Classification of opaque backend errors into HTTP responses.
//!
//! Used where the backend client reports an error without a status code.

use axum::{http::StatusCode, response::Response};

use crate::http::response::respond_with_error;
use crate::tracing_backend::BackendError;

/// Derive the status and message for a backend error.
pub fn classify(error: &BackendError) -> (StatusCode, String) {
    let status = match error {
        BackendError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Disabled | BackendError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Upstream { status, .. } if status.is_client_error() => *status,
        BackendError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        BackendError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string())
}

/// Log and write the response for a backend error.
pub fn handle_error_response(error: &BackendError) -> Response {
    let (status, message) = classify(error);
    if status.is_server_error() {
        tracing::error!(status = %status, error = %error, "Tracing backend request failed");
    } else {
        tracing::warn!(status = %status, error = %error, "Tracing backend rejected request");
    }
    respond_with_error(status, message)
}
