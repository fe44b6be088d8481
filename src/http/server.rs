//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, metrics)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::business::{resolver_from_config, ContextResolver};
use crate::config::GatewayConfig;
use crate::gateway::setup_tracing_router;
use crate::http::middleware::metrics::track_metrics;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::tracing_backend::{BackendError, JaegerClient, TracingBackend};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TracingBackend>,
    pub resolver: Arc<dyn ContextResolver>,
}

impl AppState {
    pub fn new(backend: Arc<dyn TracingBackend>, resolver: Arc<dyn ContextResolver>) -> Self {
        Self { backend, resolver }
    }
}

/// HTTP server for the trace gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server talking to the Jaeger backend named in the configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, BackendError> {
        let backend = Arc::new(JaegerClient::new(config.tracing.clone())?);
        let resolver = resolver_from_config(&config.auth);
        Ok(Self::with_state(config, AppState::new(backend, resolver)))
    }

    /// Create a server around an existing state.
    pub fn with_state(config: GatewayConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        setup_tracing_router(state)
            .route("/healthz", get(health_check))
            .route_layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tracing_url = %self.config.tracing.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Liveness probe.
async fn health_check() -> &'static str {
    "OK"
}
