//! Trace gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  TRACE GATEWAY                   │
//!                     │                                                  │
//!   Console request   │  ┌─────────┐   ┌──────────┐   ┌───────────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│ business │──▶│    gateway    │  │
//!                     │  │ server  │   │ (caller  │   │   handlers    │  │
//!                     │  └─────────┘   │ context) │   └──────┬────────┘  │
//!                     │                └──────────┘          │           │
//!                     │                                      ▼           │
//!   Console response  │  ┌──────────┐                ┌───────────────┐   │
//!   ◀─────────────────┼──│ response │◀───────────────│tracing_backend│◀──┼── Jaeger
//!                     │  │ / error  │                │ (JaegerClient)│   │   query API
//!                     │  └──────────┘                └───────────────┘   │
//!                     │                                                  │
//!                     │  config · observability · lifecycle              │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use trace_gateway::config::{load_config, GatewayConfig};
use trace_gateway::lifecycle::startup;
use trace_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "trace-gateway")]
#[command(about = "Trace-query gateway for the service-mesh console", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long, env = "TRACE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("trace-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        tracing_enabled = config.tracing.enabled,
        tracing_url = %config.tracing.url,
        auth_strategy = ?config.auth.strategy,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
