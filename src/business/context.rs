//! Caller context resolution.
//!
//! # Responsibilities
//! - Identify the caller of a request before any backend work happens
//! - Pick the resolver matching the configured auth strategy
//!
//! # Design Decisions
//! - Resolvers are stateless and shared read-only between requests
//! - Tokens come from `Authorization: Bearer` first, then the session cookie

use std::sync::Arc;

use axum::http::{header, request::Parts};
use thiserror::Error;

use crate::config::{AuthConfig, AuthStrategy};

/// Why a caller context could not be established.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("missing authentication token")]
    MissingToken,

    #[error("malformed Authorization header")]
    MalformedAuthorization,

    #[error("empty authentication token")]
    EmptyToken,
}

/// The resolved identity of the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Caller {
    token: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caller")
            .field("anonymous", &self.is_anonymous())
            .finish()
    }
}

/// Produces the caller context for an inbound request.
pub trait ContextResolver: Send + Sync {
    fn resolve(&self, parts: &Parts) -> Result<Caller, ContextError>;
}

/// Serves every request as an anonymous caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousResolver;

impl ContextResolver for AnonymousResolver {
    fn resolve(&self, _parts: &Parts) -> Result<Caller, ContextError> {
        Ok(Caller::anonymous())
    }
}

/// Requires a bearer token in the Authorization header or the session cookie.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    cookie_name: String,
}

impl TokenResolver {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    fn cookie_token(&self, parts: &Parts) -> Option<String> {
        parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim().to_string())
    }
}

impl ContextResolver for TokenResolver {
    fn resolve(&self, parts: &Parts) -> Result<Caller, ContextError> {
        if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
            let value = value
                .to_str()
                .map_err(|_| ContextError::MalformedAuthorization)?;
            let token = value
                .strip_prefix("Bearer ")
                .ok_or(ContextError::MalformedAuthorization)?
                .trim();
            if token.is_empty() {
                return Err(ContextError::EmptyToken);
            }
            return Ok(Caller::with_token(token));
        }

        match self.cookie_token(parts) {
            Some(token) if token.is_empty() => Err(ContextError::EmptyToken),
            Some(token) => Ok(Caller::with_token(token)),
            None => Err(ContextError::MissingToken),
        }
    }
}

/// Build the resolver for the configured strategy.
pub fn resolver_from_config(config: &AuthConfig) -> Arc<dyn ContextResolver> {
    match config.strategy {
        AuthStrategy::Anonymous => Arc::new(AnonymousResolver),
        AuthStrategy::Token => Arc::new(TokenResolver::new(config.cookie_name.clone())),
    }
}
