//! Tracing backend integration.
//!
//! # Responsibilities
//! - Define the operations the gateway needs from a tracing store
//! - Provide the Jaeger query API implementation
//!
//! # Design Decisions
//! - Four operations return a status alongside their payload or error; the
//!   client is the authority on those codes
//! - `spans` returns only an opaque error and leaves classification to the caller
//! - No retries or caching: one backend request per call

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::JaegerClient;
pub use error::{BackendError, BackendResult, Reply, StatusError, StatusResult};
pub use types::{Process, Reference, ServiceList, Span, Trace, TracesResponse, TracingInfo};

/// Read-only query surface of a tracing backend.
#[async_trait]
pub trait TracingBackend: Send + Sync {
    /// Where the backend lives and whether it is usable.
    async fn info(&self) -> StatusResult<TracingInfo>;

    /// Services that reported traces.
    async fn services(&self) -> StatusResult<ServiceList>;

    /// Traces of one service; `raw_query` is the console's filter string, unparsed.
    async fn traces(&self, namespace: &str, service: &str, raw_query: &str) -> StatusResult<TracesResponse>;

    /// A single trace by ID.
    async fn trace_detail(&self, trace_id: &str) -> StatusResult<TracesResponse>;

    /// Spans emitted by one service; empty bounds mean unbounded.
    async fn spans(
        &self,
        namespace: &str,
        service: &str,
        start_micros: &str,
        end_micros: &str,
    ) -> BackendResult<Vec<Span>>;
}
