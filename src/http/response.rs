//! Response writing.
//!
//! # Responsibilities
//! - Serialize payloads as JSON with an explicit status code
//! - Serialize error messages in a uniform `{"error": ...}` body
//!
//! # Design Decisions
//! - Status codes are always chosen by the caller; nothing here remaps them
//! - Serialization failures surface as 500 with an error body (axum `Json`)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Serialize `payload` as JSON with the given status.
pub fn respond_with_json<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (status, Json(payload)).into_response()
}

/// Serialize an error message with the given status.
pub fn respond_with_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
