use axum::{
    extract::{Path, RawQuery},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::business::{Business, ContextError};
use crate::http::error::handle_error_response;
use crate::http::response::{respond_with_error, respond_with_json};
use crate::observability::metrics;
use crate::tracing_backend::StatusResult;

pub const INFO_INIT_ERROR: &str = "Token initialization error";
pub const SERVICES_INIT_ERROR: &str = "Services initialization error";
pub const TRACES_INIT_ERROR: &str = "Trace Service Details initialization error";
pub const TRACE_DETAIL_INIT_ERROR: &str = "Trace Detail initialization error";
pub const SPANS_INIT_ERROR: &str = "Services initialization error";

fn initialization_error(prefix: &str, error: ContextError) -> Response {
    tracing::warn!(error = %error, "{}", prefix);
    respond_with_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}: {}", prefix, error),
    )
}

/// Write a status-bearing backend result; the backend's status is used unchanged.
fn respond_with_status<T: Serialize>(operation: &'static str, result: StatusResult<T>) -> Response {
    match result {
        Ok(reply) => respond_with_json(reply.status, reply.payload),
        Err(err) => {
            tracing::error!(operation, status = %err.status, error = %err, "Tracing backend error");
            metrics::record_backend_error(operation);
            respond_with_error(err.status, err.to_string())
        }
    }
}

/// Value of the first `key` parameter in a raw query string, empty when absent.
fn query_value(raw_query: Option<&str>, key: &str) -> String {
    raw_query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_default()
}

/// Where the tracing backend is and whether the console can use it.
pub async fn tracing_info(business: Result<Business, ContextError>) -> Response {
    let business = match business {
        Ok(b) => b,
        Err(e) => return initialization_error(INFO_INIT_ERROR, e),
    };

    respond_with_status("tracing_info", business.tracing.info().await)
}

pub async fn tracing_services(business: Result<Business, ContextError>) -> Response {
    let business = match business {
        Ok(b) => b,
        Err(e) => return initialization_error(SERVICES_INIT_ERROR, e),
    };

    respond_with_status("tracing_services", business.tracing.services().await)
}

/// Traces of one service. The request's query string goes to the backend as-is.
pub async fn service_traces(
    business: Result<Business, ContextError>,
    Path((namespace, service)): Path<(String, String)>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let business = match business {
        Ok(b) => b,
        Err(e) => return initialization_error(TRACES_INIT_ERROR, e),
    };

    let raw_query = raw_query.unwrap_or_default();
    tracing::debug!(namespace = %namespace, service = %service, query = %raw_query, "Fetching service traces");

    let result = business.tracing.traces(&namespace, &service, &raw_query).await;
    respond_with_status("service_traces", result)
}

pub async fn trace_details(
    business: Result<Business, ContextError>,
    Path(trace_id): Path<String>,
) -> Response {
    let business = match business {
        Ok(b) => b,
        Err(e) => return initialization_error(TRACE_DETAIL_INIT_ERROR, e),
    };

    respond_with_status("trace_details", business.tracing.trace_detail(&trace_id).await)
}

/// Spans of one service. The backend gives no status here, so failures are
/// classified from the error itself and success is always 200.
pub async fn service_spans(
    business: Result<Business, ContextError>,
    Path((namespace, service)): Path<(String, String)>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let business = match business {
        Ok(b) => b,
        Err(e) => return initialization_error(SPANS_INIT_ERROR, e),
    };

    let start_micros = query_value(raw_query.as_deref(), "startMicros");
    let end_micros = query_value(raw_query.as_deref(), "endMicros");

    match business
        .tracing
        .spans(&namespace, &service, &start_micros, &end_micros)
        .await
    {
        Ok(spans) => respond_with_json(StatusCode::OK, spans),
        Err(e) => {
            metrics::record_backend_error("service_spans");
            handle_error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_value() {
        let q = Some("startMicros=1000&endMicros=2000&startMicros=5");
        assert_eq!(query_value(q, "startMicros"), "1000");
        assert_eq!(query_value(q, "endMicros"), "2000");
        assert_eq!(query_value(q, "limit"), "");
        assert_eq!(query_value(None, "startMicros"), "");
    }
}
