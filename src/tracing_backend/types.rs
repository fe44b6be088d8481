//! Payloads exchanged with the Jaeger query API.
//!
//! Tags, logs and warnings are kept as raw JSON: the gateway hands them to the
//! console untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Connectivity information about the tracing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingInfo {
    pub enabled: bool,
    /// True when the gateway can query the backend (in-cluster URL set).
    pub integration: bool,
    /// URL the console should link to.
    pub url: String,
    pub namespace_selector: bool,
    pub whitelist_istio_system: Vec<String>,
}

/// Service names known to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceList {
    pub services: Vec<String>,
}

/// Envelope used by every Jaeger query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JaegerEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub errors: Option<Vec<JaegerError>>,
}

/// Error entry reported inside a Jaeger envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JaegerError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(rename = "traceID", default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Trace collection as returned to the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracesResponse {
    pub data: Vec<Trace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JaegerError>,
}

/// A collection of spans sharing a trace ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub processes: HashMap<String, Process>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

/// A single operation within a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default)]
    pub operation_name: String,
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Microseconds since unix epoch.
    #[serde(default)]
    pub start_time: u64,
    /// Microseconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub tags: Vec<JsonValue>,
    #[serde(default)]
    pub logs: Vec<JsonValue>,
    #[serde(rename = "processID", default)]
    pub process_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

/// Reference from one span to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub ref_type: String,
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
}

/// The process emitting a set of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub service_name: String,
    #[serde(default)]
    pub tags: Vec<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_jaeger_trace() {
        let raw = serde_json::json!({
            "data": [{
                "traceID": "abc123",
                "spans": [{
                    "traceID": "abc123",
                    "spanID": "s1",
                    "operationName": "GET /",
                    "references": [],
                    "startTime": 1000,
                    "duration": 20,
                    "tags": [{"key": "http.status_code", "type": "int64", "value": 200}],
                    "logs": [],
                    "processID": "p1"
                }],
                "processes": {"p1": {"serviceName": "svc1.ns1", "tags": []}},
                "warnings": null
            }],
            "total": 0, "limit": 0, "offset": 0, "errors": null
        });

        let envelope: JaegerEnvelope<Vec<Trace>> = serde_json::from_value(raw).unwrap();
        let traces = envelope.data.unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].spans[0].operation_name, "GET /");
        assert_eq!(traces[0].processes["p1"].service_name, "svc1.ns1");
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn test_info_is_camel_case() {
        let info = TracingInfo {
            enabled: true,
            integration: true,
            url: "http://jaeger".into(),
            namespace_selector: true,
            whitelist_istio_system: vec!["jaeger-query".into()],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["namespaceSelector"], true);
        assert_eq!(json["whitelistIstioSystem"][0], "jaeger-query");
    }
}
