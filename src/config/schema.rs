//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the trace gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// External tracing backend settings.
    pub tracing: TracingConfig,

    /// Caller authentication settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:20001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:20001".to_string(),
        }
    }
}

/// Tracing backend (Jaeger query API) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Whether the tracing integration is enabled at all.
    pub enabled: bool,

    /// In-cluster URL of the Jaeger query service. Empty disables querying
    /// while the console still links to `public_url`.
    pub url: String,

    /// URL the console links to; falls back to `url` when empty.
    pub public_url: String,

    /// Label selector used to map Jaeger services to namespaces.
    pub namespace_selector: bool,

    /// Namespaces whose services are registered in Jaeger without a namespace suffix.
    pub whitelist_istio_system: Vec<String>,

    /// Namespace of the Istio control plane.
    pub istio_namespace: String,

    /// Timeout for a single backend query in seconds.
    pub timeout_secs: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://tracing.istio-system:16686".to_string(),
            public_url: String::new(),
            namespace_selector: true,
            whitelist_istio_system: vec!["jaeger-query".to_string(), "istio-ingressgateway".to_string()],
            istio_namespace: "istio-system".to_string(),
            timeout_secs: 10,
        }
    }
}

/// How callers are identified before any backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Every request is served as an anonymous caller.
    Anonymous,
    /// A bearer token (header or session cookie) is required.
    Token,
}

/// Caller authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Authentication strategy.
    pub strategy: AuthStrategy,

    /// Session cookie carrying the token when no Authorization header is sent.
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategy: AuthStrategy::Token,
            cookie_name: "kiali-token".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
