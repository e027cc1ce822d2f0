//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origins and path prefixes
//! - Check the throttle fits inside the request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("delegate.address `{0}` is not a valid host:port")]
    DelegateAddress(String),

    #[error("registry.upstream_origin `{0}` must start with http:// or https://")]
    UpstreamOrigin(String),

    #[error("registry.{field} `{value}` must start with '/'")]
    PathPrefix { field: &'static str, value: String },

    #[error("registry.throttle_secs ({throttle}) must be below timeouts.request_secs ({request})")]
    ThrottleExceedsTimeout { throttle: u64, request: u64 },

    #[error("store.database_url is required")]
    MissingDatabaseUrl,

    #[error("store.max_connections must be greater than zero")]
    NoStoreConnections,

    #[error("cache.list_key must not be empty")]
    EmptyListKey,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.delegate.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::DelegateAddress(config.delegate.address.clone()));
    }

    let registry = &config.registry;
    if !(registry.upstream_origin.starts_with("http://")
        || registry.upstream_origin.starts_with("https://"))
    {
        errors.push(ValidationError::UpstreamOrigin(registry.upstream_origin.clone()));
    }

    for (field, value) in [
        ("list_path", &registry.list_path),
        ("package_prefix", &registry.package_prefix),
        ("search_prefix", &registry.search_prefix),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::PathPrefix {
                field,
                value: value.clone(),
            });
        }
    }

    if registry.throttle_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::ThrottleExceedsTimeout {
            throttle: registry.throttle_secs,
            request: config.timeouts.request_secs,
        });
    }

    if config.store.database_url.is_empty() {
        errors.push(ValidationError::MissingDatabaseUrl);
    }
    if config.store.max_connections == 0 {
        errors.push(ValidationError::NoStoreConnections);
    }

    if config.cache.list_key.is_empty() {
        errors.push(ValidationError::EmptyListKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
