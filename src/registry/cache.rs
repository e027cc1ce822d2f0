//! Package list cache client.
//!
//! # Responsibilities
//! - Connect to memcached (optionally with SASL credentials)
//! - Read a single key as opaque bytes
//!
//! # Design Decisions
//! - Read-only: the list is populated by another process
//! - The memcache client is blocking; reads run on the blocking pool so the
//!   request task yields instead of stalling a worker
//! - Credentials switch the connection to the binary protocol, which is the
//!   only one that carries SASL authentication
//! - The client sends SASL credentials exactly as they appear in the URL
//!   userinfo, so credentials that percent-encoding would alter are refused

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

use crate::config::CacheConfig;
use crate::registry::CacheLookup;

/// Errors raised by the list cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache address `{0}`")]
    Address(String),

    #[error("cache {0} contains characters that cannot be sent to memcached verbatim")]
    Credentials(&'static str),

    #[error("memcached error: {0}")]
    Memcache(#[from] memcache::MemcacheError),

    #[error("cache read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the pre-serialized package list.
#[async_trait]
pub trait ListCache: Send + Sync {
    /// Read `key`, reporting hit, miss or client failure.
    async fn fetch(&self, key: &str) -> CacheLookup;
}

/// Memcached-backed list cache.
#[derive(Clone)]
pub struct MemcacheListCache {
    client: Arc<memcache::Client>,
}

impl MemcacheListCache {
    /// Connect to the configured server. Fails if the server is unreachable
    /// or rejects the credentials.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let target = connection_url(config)?;
        let client = tokio::task::spawn_blocking(move || memcache::Client::connect(target)).await??;

        tracing::info!(
            servers = %config.servers,
            authenticated = config.credentials().is_some(),
            "List cache connected"
        );

        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let client = Arc::clone(&self.client);
        let key = key.to_string();
        let value = tokio::task::spawn_blocking(move || client.get::<Vec<u8>>(&key)).await??;
        Ok(value)
    }
}

#[async_trait]
impl ListCache for MemcacheListCache {
    async fn fetch(&self, key: &str) -> CacheLookup {
        match self.get(key).await {
            Ok(Some(value)) => CacheLookup::Hit(Bytes::from(value)),
            Ok(None) => CacheLookup::Miss,
            Err(e) => CacheLookup::Error(e),
        }
    }
}

/// Build the memcache connection URL for `config`.
fn connection_url(config: &CacheConfig) -> Result<String, CacheError> {
    let mut url = url::Url::parse(&format!("memcache://{}", config.servers))
        .map_err(|_| CacheError::Address(config.servers.clone()))?;

    if let Some((username, password)) = config.credentials() {
        url.set_username(username)
            .map_err(|_| CacheError::Address(config.servers.clone()))?;
        if url.username() != username {
            return Err(CacheError::Credentials("username"));
        }

        url.set_password(Some(password))
            .map_err(|_| CacheError::Address(config.servers.clone()))?;
        if url.password() != Some(password) {
            return Err(CacheError::Credentials("password"));
        }

        url.query_pairs_mut().append_pair("protocol", "binary");
    }

    Ok(url.to_string())
}
