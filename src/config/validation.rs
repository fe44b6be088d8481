//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs parse
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("invalid tracing url '{url}': {reason}")]
    TracingUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("auth cookie name must not be empty")]
    EmptyCookieName,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    // A disabled integration never dials the backend, so its URL is irrelevant.
    // An empty in-cluster URL is allowed when the console only links out.
    if config.tracing.enabled {
        if config.tracing.url.is_empty() {
            if config.tracing.public_url.is_empty() {
                errors.push(ValidationError::TracingUrl {
                    url: String::new(),
                    reason: "url or public_url must be set".to_string(),
                });
            }
        } else if let Err(e) = url::Url::parse(&config.tracing.url) {
            errors.push(ValidationError::TracingUrl {
                url: config.tracing.url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.tracing.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("tracing.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.auth.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
