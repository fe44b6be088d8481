//! Shared fakes and helpers for gateway tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use trace_gateway::business::ContextResolver;
use trace_gateway::config::GatewayConfig;
use trace_gateway::http::{AppState, HttpServer};
use trace_gateway::tracing_backend::{
    BackendError, BackendResult, Reply, ServiceList, Span, StatusError, StatusResult, Trace,
    TracesResponse, TracingBackend, TracingInfo,
};

/// A backend call as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Info,
    Services,
    Traces { namespace: String, service: String, raw_query: String },
    TraceDetail(String),
    Spans { namespace: String, service: String, start: String, end: String },
}

/// In-memory tracing backend recording every call.
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    /// Status reported with successful status-bearing replies.
    status: StatusCode,
    /// Failure returned by every status-bearing operation.
    failure: Option<(StatusCode, fn() -> BackendError)>,
    /// Failure returned by `spans`.
    spans_failure: Option<fn() -> BackendError>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status: StatusCode::OK,
            failure: None,
            spans_failure: None,
        }
    }
}

impl FakeBackend {
    /// Succeeds everywhere, reporting `status` on status-bearing replies.
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Fails every status-bearing operation with `status` and `make_error()`.
    pub fn failing(status: StatusCode, make_error: fn() -> BackendError) -> Self {
        Self {
            failure: Some((status, make_error)),
            ..Self::default()
        }
    }

    /// Make `spans` fail with `make_error()`.
    pub fn with_spans_failure(mut self, make_error: fn() -> BackendError) -> Self {
        self.spans_failure = Some(make_error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T>(&self, payload: T) -> StatusResult<T> {
        match self.failure {
            Some((status, make_error)) => Err(StatusError::new(status, make_error())),
            None => Ok(Reply {
                payload,
                status: self.status,
            }),
        }
    }
}

pub fn sample_span(id: &str) -> Span {
    Span {
        trace_id: "abc123".into(),
        span_id: id.into(),
        operation_name: "GET /ratings".into(),
        start_time: 1500,
        duration: 42,
        process_id: "p1".into(),
        ..Span::default()
    }
}

pub fn sample_traces() -> TracesResponse {
    TracesResponse {
        data: vec![Trace {
            trace_id: "abc123".into(),
            spans: vec![sample_span("s1")],
            ..Trace::default()
        }],
        errors: Vec::new(),
    }
}

#[async_trait]
impl TracingBackend for FakeBackend {
    async fn info(&self) -> StatusResult<TracingInfo> {
        self.record(Call::Info);
        self.reply(TracingInfo {
            enabled: true,
            integration: true,
            url: "http://jaeger.example.com".into(),
            namespace_selector: true,
            whitelist_istio_system: vec!["jaeger-query".into()],
        })
    }

    async fn services(&self) -> StatusResult<ServiceList> {
        self.record(Call::Services);
        self.reply(ServiceList {
            services: vec!["svc1.ns1".into(), "svc2.ns1".into()],
        })
    }

    async fn traces(&self, namespace: &str, service: &str, raw_query: &str) -> StatusResult<TracesResponse> {
        self.record(Call::Traces {
            namespace: namespace.into(),
            service: service.into(),
            raw_query: raw_query.into(),
        });
        self.reply(sample_traces())
    }

    async fn trace_detail(&self, trace_id: &str) -> StatusResult<TracesResponse> {
        self.record(Call::TraceDetail(trace_id.into()));
        self.reply(sample_traces())
    }

    async fn spans(
        &self,
        namespace: &str,
        service: &str,
        start_micros: &str,
        end_micros: &str,
    ) -> BackendResult<Vec<Span>> {
        self.record(Call::Spans {
            namespace: namespace.into(),
            service: service.into(),
            start: start_micros.into(),
            end: end_micros.into(),
        });
        match self.spans_failure {
            Some(make_error) => Err(make_error()),
            None => Ok(vec![sample_span("s1"), sample_span("s2")]),
        }
    }
}

/// Build the full router around a fake backend.
pub fn app(backend: Arc<FakeBackend>, resolver: Arc<dyn ContextResolver>) -> Router {
    HttpServer::build_router(&GatewayConfig::default(), AppState::new(backend, resolver))
}

/// Send a GET and return the status, `x-request-id` and JSON body.
pub async fn get(app: Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, request_id, body)
}
