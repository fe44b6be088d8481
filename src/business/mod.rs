//! Per-request business handle.
//!
//! A `Business` is built for every request from the shared resolver and
//! tracing backend; nothing about a caller outlives its request.

pub mod context;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::respond_with_error;
use crate::http::server::AppState;
use crate::tracing_backend::TracingBackend;

pub use context::{
    resolver_from_config, AnonymousResolver, Caller, ContextError, ContextResolver, TokenResolver,
};

/// Caller context plus the services it may use.
#[derive(Clone)]
pub struct Business {
    pub caller: Caller,
    pub tracing: Arc<dyn TracingBackend>,
}

impl FromRequestParts<AppState> for Business {
    type Rejection = ContextError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let caller = state.resolver.resolve(parts)?;
        Ok(Self {
            caller,
            tracing: state.backend.clone(),
        })
    }
}

/// Satisfies the extractor's rejection bound; handlers take `Result<Business, ContextError>` and build their own prefixed error.
impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        respond_with_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Initialization error: {}", self),
        )
    }
}
