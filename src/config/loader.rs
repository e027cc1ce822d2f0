//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid PORT `{0}`")]
    Port(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment environment on top of a loaded configuration.
///
/// Recognized variables: `PORT`, `DATABASE_URL`, `MEMCACHEDCLOUD_SERVERS`,
/// `MEMCACHEDCLOUD_USERNAME`, `MEMCACHEDCLOUD_PASSWORD`. Empty values are
/// treated as unset.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(port) = var("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::Port(port.clone()))?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }
    if let Some(url) = var("DATABASE_URL") {
        config.store.database_url = url;
    }
    if let Some(servers) = var("MEMCACHEDCLOUD_SERVERS") {
        config.cache.servers = servers;
    }
    if let Some(username) = var("MEMCACHEDCLOUD_USERNAME") {
        config.cache.username = username;
    }
    if let Some(password) = var("MEMCACHEDCLOUD_PASSWORD") {
        config.cache.password = password;
    }

    Ok(())
}
