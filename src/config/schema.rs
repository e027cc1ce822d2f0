//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the registry gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Registry protocol surface: endpoints, migration and throttling.
    pub registry: RegistryConfig,

    /// Metadata store (PostgreSQL) settings.
    pub store: StoreConfig,

    /// Package list cache (memcached) settings.
    pub cache: CacheConfig,

    /// Local application server that receives unmatched traffic.
    pub delegate: DelegateConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Delegate connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    /// Must stay above `registry.throttle_secs`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Registry endpoints and legacy traffic migration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Canonical registry origin that legacy traffic is redirected to.
    pub upstream_origin: String,

    /// Hosts already pointed at the canonical registry. Never redirected.
    pub migrated_hosts: Vec<String>,

    /// Exact path of the package list endpoint.
    pub list_path: String,

    /// Path prefix of single package lookups.
    pub package_prefix: String,

    /// Path prefix of the retired search endpoint.
    pub search_prefix: String,

    /// Delay applied to every redirected request, in seconds.
    pub throttle_secs: u64,

    /// Name of the synthetic record returned for search queries.
    pub deprecated_name: String,

    /// Message returned in the `url` field of the synthetic search record.
    pub deprecation_message: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            upstream_origin: "https://registry.bower.io".to_string(),
            migrated_hosts: vec![
                "registry.bower.io".to_string(),
                "components.bower.io".to_string(),
            ],
            list_path: "/packages".to_string(),
            package_prefix: "/packages/".to_string(),
            search_prefix: "/packages/search/".to_string(),
            throttle_secs: 10,
            deprecated_name: "deprecated".to_string(),
            deprecation_message:
                "This bower version is deprecated. Please update it: npm update -g bower".to_string(),
        }
    }
}

/// Metadata store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum pooled connections.
    pub max_connections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 20,
        }
    }
}

/// Package list cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memcached server as `host:port`.
    pub servers: String,

    /// SASL username. Authentication is used only when both fields are set.
    pub username: String,

    /// SASL password.
    pub password: String,

    /// Key holding the serialized package list.
    pub list_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            servers: "localhost:11211".to_string(),
            username: String::new(),
            password: String::new(),
            list_key: "packages".to_string(),
        }
    }
}

impl CacheConfig {
    /// Returns `(username, password)` when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((&self.username, &self.password))
        }
    }
}

/// Local application server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DelegateConfig {
    /// Address unmatched traffic is relayed to (e.g., "127.0.0.1:3001").
    pub address: String,

    /// Command launching the local server. Empty means it is managed elsewhere.
    pub command: Vec<String>,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3001".to_string(),
            command: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_registry_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.registry.upstream_origin, "https://registry.bower.io");
        assert_eq!(config.registry.migrated_hosts.len(), 2);
        assert_eq!(config.registry.throttle_secs, 10);
        assert_eq!(config.cache.list_key, "packages");
        assert_eq!(config.store.max_connections, 20);
        assert_eq!(config.delegate.address, "127.0.0.1:3001");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [registry]
            throttle_secs = 2

            [store]
            database_url = "postgres://localhost/registry"
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.throttle_secs, 2);
        assert_eq!(config.registry.list_path, "/packages");
        assert_eq!(config.store.database_url, "postgres://localhost/registry");
        assert_eq!(config.store.max_connections, 20);
    }

    #[test]
    fn credentials_require_both_fields() {
        let mut cache = CacheConfig::default();
        assert!(cache.credentials().is_none());

        cache.username = "user".into();
        assert!(cache.credentials().is_none());

        cache.password = "secret".into();
        assert_eq!(cache.credentials(), Some(("user", "secret")));
    }
}
