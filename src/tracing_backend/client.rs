//! Jaeger query API client with timeout and error handling.
//!
//! # Responsibilities
//! - Query the Jaeger HTTP API (services, traces, trace detail)
//! - Translate the console's namespace/service pair into a Jaeger service name
//! - Parse and check span time bounds
//! - Classify failures into status codes for the status-bearing operations

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::TracingConfig;
use crate::tracing_backend::error::{
    BackendError, BackendResult, Reply, StatusError, StatusResult,
};
use crate::tracing_backend::types::{
    JaegerEnvelope, ServiceList, Span, Trace, TracesResponse, TracingInfo,
};
use crate::tracing_backend::TracingBackend;

/// Status the client reports for a given failure on the status-bearing operations.
pub fn status_for(error: &BackendError) -> StatusCode {
    match error {
        BackendError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Upstream { status, .. } => *status,
        BackendError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn with_status(error: BackendError) -> StatusError {
    StatusError::new(status_for(&error), error)
}

/// Jaeger query client.
#[derive(Clone)]
pub struct JaegerClient {
    http: reqwest::Client,
    /// `None` when tracing is disabled or only a public URL is configured.
    base_url: Option<Url>,
    config: TracingConfig,
}

impl JaegerClient {
    /// Create a new client.
    ///
    /// Fails only when tracing is enabled and the in-cluster URL cannot be parsed.
    pub fn new(config: TracingConfig) -> BackendResult<Self> {
        let base_url = if config.enabled && !config.url.is_empty() {
            let url = Url::parse(&config.url).map_err(|e| {
                BackendError::Unavailable(format!("invalid tracing url '{}': {}", config.url, e))
            })?;
            Some(url)
        } else {
            None
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        tracing::info!(
            enabled = config.enabled,
            url = %config.url,
            timeout_secs = config.timeout_secs,
            "Tracing backend client initialized"
        );

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TracingConfig {
        &self.config
    }

    /// Name under which Jaeger knows a service of the given namespace.
    pub fn jaeger_service_name(&self, namespace: &str, service: &str) -> String {
        let bare = !self.config.namespace_selector
            || (namespace == self.config.istio_namespace
                && self.config.whitelist_istio_system.iter().any(|s| s == service));
        if bare {
            service.to_string()
        } else {
            format!("{}.{}", service, namespace)
        }
    }

    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = match &self.base_url {
            Some(url) => url.clone(),
            None if !self.config.enabled => return Err(BackendError::Disabled),
            None => {
                return Err(BackendError::Unavailable(
                    "no in-cluster tracing url configured".to_string(),
                ))
            }
        };
        url.path_segments_mut()
            .map_err(|_| BackendError::Unavailable(format!("tracing url '{}' cannot be a base", self.config.url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> BackendResult<(T, StatusCode)> {
        tracing::debug!(url = %url, "Querying tracing backend");

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.config.timeout_secs)
            } else {
                BackendError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(status = %status, error = %e, "Failed to read error body from tracing backend");
                    String::new()
                }
            };
            return Err(BackendError::Upstream { status, message });
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok((body, status))
    }

    async fn fetch_traces(&self, url: Url, resource: &str) -> BackendResult<(TracesResponse, StatusCode)> {
        let (envelope, status) = self.get_json::<JaegerEnvelope<Vec<Trace>>>(url, resource).await?;
        let response = TracesResponse {
            data: envelope.data.unwrap_or_default(),
            errors: envelope.errors.unwrap_or_default(),
        };
        Ok((response, status))
    }
}

fn parse_micros(name: &'static str, raw: &str) -> BackendResult<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|e| BackendError::InvalidParameter {
            name,
            reason: format!("'{}' is not a microsecond timestamp ({})", raw, e),
        })
}

/// Raw query with every caller-supplied `service` pair replaced by the derived one.
///
/// Other pairs keep their original encoding and order.
fn traces_query(raw_query: &str, jaeger_service: &str) -> String {
    let mut pairs: Vec<String> = raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !url::form_urlencoded::parse(key.as_bytes()).any(|(k, _)| k == "service")
        })
        .map(str::to_owned)
        .collect();
    pairs.push(format!("service={}", urlencoding::encode(jaeger_service)));
    pairs.join("&")
}

/// Spans of `trace` emitted by a process registered as `service_name`.
fn spans_of_service(trace: Trace, service_name: &str) -> impl Iterator<Item = Span> + '_ {
    let process_ids: HashSet<String> = trace
        .processes
        .iter()
        .filter(|(_, p)| p.service_name == service_name)
        .map(|(id, _)| id.clone())
        .collect();

    trace.spans.into_iter().filter(move |span| {
        process_ids.contains(&span.process_id)
            || span
                .process
                .as_ref()
                .is_some_and(|p| p.service_name == service_name)
    })
}

#[async_trait]
impl TracingBackend for JaegerClient {
    async fn info(&self) -> StatusResult<TracingInfo> {
        if !self.config.enabled {
            return Err(with_status(BackendError::Disabled));
        }

        let url = if self.config.public_url.is_empty() {
            self.config.url.clone()
        } else {
            self.config.public_url.clone()
        };

        Ok(Reply::ok(TracingInfo {
            enabled: true,
            integration: self.base_url.is_some(),
            url,
            namespace_selector: self.config.namespace_selector,
            whitelist_istio_system: self.config.whitelist_istio_system.clone(),
        }))
    }

    async fn services(&self) -> StatusResult<ServiceList> {
        let url = self.endpoint(&["api", "services"]).map_err(with_status)?;
        let (envelope, status) = self
            .get_json::<JaegerEnvelope<Vec<String>>>(url, "services")
            .await
            .map_err(with_status)?;

        Ok(Reply {
            payload: ServiceList {
                services: envelope.data.unwrap_or_default(),
            },
            status,
        })
    }

    async fn traces(&self, namespace: &str, service: &str, raw_query: &str) -> StatusResult<TracesResponse> {
        let mut url = self.endpoint(&["api", "traces"]).map_err(with_status)?;

        let jaeger_service = self.jaeger_service_name(namespace, service);
        url.set_query(Some(&traces_query(raw_query, &jaeger_service)));

        let (payload, status) = self
            .fetch_traces(url, &format!("traces for service {}", jaeger_service))
            .await
            .map_err(with_status)?;
        Ok(Reply { payload, status })
    }

    async fn trace_detail(&self, trace_id: &str) -> StatusResult<TracesResponse> {
        let url = self.endpoint(&["api", "traces", trace_id]).map_err(with_status)?;
        let (payload, status) = self
            .fetch_traces(url, &format!("trace {}", trace_id))
            .await
            .map_err(with_status)?;
        Ok(Reply { payload, status })
    }

    async fn spans(
        &self,
        namespace: &str,
        service: &str,
        start_micros: &str,
        end_micros: &str,
    ) -> BackendResult<Vec<Span>> {
        let start = parse_micros("startMicros", start_micros)?;
        let end = parse_micros("endMicros", end_micros)?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(BackendError::InvalidParameter {
                    name: "endMicros",
                    reason: format!("{} is before startMicros {}", end, start),
                });
            }
        }

        let jaeger_service = self.jaeger_service_name(namespace, service);
        let mut url = self.endpoint(&["api", "traces"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("service", &jaeger_service);
            if let Some(start) = start {
                pairs.append_pair("start", &start.to_string());
            }
            if let Some(end) = end {
                pairs.append_pair("end", &end.to_string());
            }
        }

        let (traces, _) = self
            .fetch_traces(url, &format!("spans for service {}", jaeger_service))
            .await?;

        let spans: Vec<Span> = traces
            .data
            .into_iter()
            .flat_map(|trace| spans_of_service(trace, &jaeger_service).collect::<Vec<_>>())
            .collect();

        tracing::debug!(service = %jaeger_service, count = spans.len(), "Collected spans");
        Ok(spans)
    }
}

impl std::fmt::Debug for JaegerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JaegerClient")
            .field("url", &self.config.url)
            .field("enabled", &self.config.enabled)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str) -> TracingConfig {
        TracingConfig {
            url: url.to_string(),
            timeout_secs: 2,
            ..TracingConfig::default()
        }
    }

    fn trace_json() -> serde_json::Value {
        json!({
            "data": [{
                "traceID": "abc123",
                "spans": [
                    {"traceID": "abc123", "spanID": "s1", "operationName": "in", "references": [],
                     "startTime": 1500, "duration": 10, "tags": [], "logs": [], "processID": "p1"},
                    {"traceID": "abc123", "spanID": "s2", "operationName": "out", "references": [],
                     "startTime": 1600, "duration": 10, "tags": [], "logs": [], "processID": "p2"}
                ],
                "processes": {
                    "p1": {"serviceName": "svc1.ns1", "tags": []},
                    "p2": {"serviceName": "other.ns1", "tags": []}
                }
            }],
            "total": 0, "limit": 0, "offset": 0, "errors": null
        })
    }

    #[test]
    fn test_jaeger_service_name() {
        let client = JaegerClient::new(test_config("http://localhost:16686")).unwrap();
        assert_eq!(client.jaeger_service_name("ns1", "svc1"), "svc1.ns1");
        assert_eq!(client.jaeger_service_name("istio-system", "jaeger-query"), "jaeger-query");
        assert_eq!(client.jaeger_service_name("istio-system", "grafana"), "grafana.istio-system");

        let mut config = test_config("http://localhost:16686");
        config.namespace_selector = false;
        let client = JaegerClient::new(config).unwrap();
        assert_eq!(client.jaeger_service_name("ns1", "svc1"), "svc1");
    }

    #[test]
    fn test_parse_micros() {
        assert_eq!(parse_micros("startMicros", "").unwrap(), None);
        assert_eq!(parse_micros("startMicros", "0").unwrap(), Some(0));
        assert_eq!(parse_micros("startMicros", "1000").unwrap(), Some(1000));
        assert!(matches!(
            parse_micros("endMicros", "soon"),
            Err(BackendError::InvalidParameter { name: "endMicros", .. })
        ));
    }

    #[test]
    fn test_traces_query_replaces_service() {
        assert_eq!(traces_query("", "svc1.ns1"), "service=svc1.ns1");
        assert_eq!(
            traces_query("service=secret.other-ns&limit=5", "svc1.ns1"),
            "limit=5&service=svc1.ns1"
        );
        assert_eq!(
            traces_query("tags=%7B%7D&serv%69ce=x&lookback=1h&service", "svc1.ns1"),
            "tags=%7B%7D&lookback=1h&service=svc1.ns1"
        );
        assert_eq!(traces_query("services=a&limit=5", "svc1.ns1"), "services=a&limit=5&service=svc1.ns1");
    }

    #[tokio::test]
    async fn test_info_disabled() {
        let mut config = test_config("");
        config.enabled = false;
        let client = JaegerClient::new(config).unwrap();

        let err = client.info().await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "tracing is not enabled");
    }

    #[tokio::test]
    async fn test_info_prefers_public_url() {
        let mut config = test_config("http://jaeger-query:16686");
        config.public_url = "https://jaeger.example.com".into();
        let client = JaegerClient::new(config).unwrap();

        let reply = client.info().await.unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.payload.url, "https://jaeger.example.com");
        assert!(reply.payload.integration);
    }

    #[tokio::test]
    async fn test_public_url_only_has_no_integration() {
        let mut config = test_config("");
        config.public_url = "https://jaeger.example.com".into();
        let client = JaegerClient::new(config).unwrap();

        let reply = client.info().await.unwrap();
        assert_eq!(reply.payload.url, "https://jaeger.example.com");
        assert!(!reply.payload.integration);

        let err = client.services().await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(err.error, BackendError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_services() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/services"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": ["svc1.ns1", "jaeger-query"], "total": 2, "limit": 0, "offset": 0, "errors": null
            })))
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let reply = client.services().await.unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.payload.services, vec!["svc1.ns1", "jaeger-query"]);
    }

    #[tokio::test]
    async fn test_services_upstream_failure_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/services"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let err = client.services().await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_traces_forwards_raw_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces"))
            .and(query_param("limit", "20"))
            .and(query_param("tags", "{\"error\":\"true\"}"))
            .and(query_param("service", "svc1.ns1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(trace_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let reply = client
            .traces("ns1", "svc1", "limit=20&tags=%7B%22error%22%3A%22true%22%7D")
            .await
            .unwrap();
        assert_eq!(reply.payload.data.len(), 1);
        assert_eq!(reply.payload.data[0].trace_id, "abc123");
    }

    #[tokio::test]
    async fn test_traces_caller_service_cannot_override_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        client
            .traces("ns1", "svc1", "service=secret.other-ns&limit=5")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let services: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "service")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(services, vec!["svc1.ns1"]);
        assert_eq!(requests[0].url.query(), Some("limit=5&service=svc1.ns1"));
    }

    #[tokio::test]
    async fn test_trace_detail_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces/abc123"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "data": null, "errors": [{"code": 404, "msg": "trace not found"}]
            })))
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let err = client.trace_detail("abc123").await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "trace abc123 not found");
    }

    #[tokio::test]
    async fn test_spans_filters_by_service_and_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces"))
            .and(query_param("service", "svc1.ns1"))
            .and(query_param("start", "1000"))
            .and(query_param("end", "2000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(trace_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let spans = client.spans("ns1", "svc1", "1000", "2000").await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span_id, "s1");
    }

    #[tokio::test]
    async fn test_spans_missing_bounds_are_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces"))
            .and(query_param("service", "svc1.ns1"))
            .and(query_param_is_missing("start"))
            .and(query_param_is_missing("end"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let spans = client.spans("ns1", "svc1", "", "").await.unwrap();
        assert!(spans.is_empty());
    }

    #[tokio::test]
    async fn test_spans_rejects_inverted_range_without_calling_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = JaegerClient::new(test_config(&server.uri())).unwrap();
        let err = client.spans("ns1", "svc1", "2000", "1000").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidParameter { name: "endMicros", .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Nothing listens on port 9 locally.
        let client = JaegerClient::new(test_config("http://127.0.0.1:9")).unwrap();
        let err = client.services().await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
