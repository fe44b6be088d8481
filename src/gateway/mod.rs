//! Trace-query gateway.
//!
//! # Data Flow
//! ```text
//! request
//!     → Business extractor (caller context; failure = 500 + operation prefix)
//!     → path / query parameters, forwarded unvalidated
//!     → TracingBackend call (exactly one)
//!     → status from the backend (info, services, traces, trace detail)
//!       or from the error classifier (spans)
//!     → JSON response
//! ```
//!
//! # Design Decisions
//! - Handlers hold no state; everything arrives per request
//! - The raw query string of a traces request is never parsed here
//! - No retries, no partial results

pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub fn setup_tracing_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tracing", get(tracing_info))
        .route("/api/tracing/services", get(tracing_services))
        .route(
            "/api/namespaces/{namespace}/services/{service}/traces",
            get(service_traces),
        )
        .route(
            "/api/namespaces/{namespace}/services/{service}/spans",
            get(service_spans),
        )
        .route("/api/traces/{trace_id}", get(trace_details))
        .with_state(state)
}
