//! Trace-query gateway for a service-mesh observability console.
//!
//! Exposes tracing backend data (connectivity info, services, traces, spans)
//! over HTTP and maps backend outcomes onto a uniform status-code contract.

pub mod business;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod tracing_backend;

pub use config::GatewayConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
