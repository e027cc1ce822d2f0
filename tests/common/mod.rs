//! Shared fixtures for gateway integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use registry_gateway::config::GatewayConfig;
use registry_gateway::registry::{
    CacheError, CacheLookup, ListCache, Package, PackageStore, StoreError,
};
use registry_gateway::HttpServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const LEGACY_HOST: &str = "bower.herokuapp.com";
pub const MIGRATED_HOST: &str = "registry.bower.io";

/// In-memory metadata store that counts lookups.
#[derive(Default)]
pub struct MemoryStore {
    packages: HashMap<String, String>,
    pub lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn with(packages: &[(&str, &str)]) -> Self {
        Self {
            packages: packages
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PackageStore for MemoryStore {
    async fn find_package(&self, name: &str) -> Result<Option<Package>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .packages
            .get(name)
            .map(|url| Package::new(name, url.clone())))
    }
}

/// Store whose every query fails.
pub struct FailingStore;

#[async_trait]
impl PackageStore for FailingStore {
    async fn find_package(&self, _name: &str) -> Result<Option<Package>, StoreError> {
        Err(StoreError::Unavailable("server closed the connection unexpectedly".into()))
    }
}

/// Cache returning a fixed lookup result.
pub enum StaticCache {
    Hit(&'static [u8]),
    Miss,
    Broken,
}

#[async_trait]
impl ListCache for StaticCache {
    async fn fetch(&self, _key: &str) -> CacheLookup {
        match self {
            StaticCache::Hit(value) => CacheLookup::Hit(Bytes::from_static(*value)),
            StaticCache::Miss => CacheLookup::Miss,
            StaticCache::Broken => {
                CacheLookup::Error(CacheError::Unavailable("connection refused".into()))
            }
        }
    }
}

/// Default configuration pointed at `delegate`.
pub fn test_config(delegate: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.store.database_url = "postgres://unused/registry".into();
    config.delegate.address = delegate.to_string();
    config.timeouts.connect_secs = 1;
    config
}

/// Build the gateway router over the given backends.
pub fn gateway(
    config: GatewayConfig,
    store: impl PackageStore + 'static,
    cache: impl ListCache + 'static,
) -> axum::Router {
    HttpServer::new(config, Arc::new(store), Arc::new(cache))
        .unwrap()
        .router()
}

/// Send one request through the router in-process.
pub async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(host: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Host", host)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a mock delegate that echoes the request line, Host header and body.
///
/// Response body format:
/// ```text
/// GET /path?query HTTP/1.1
/// host: example.com
/// body: ...
/// ```
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 4096];

                        let head_end = loop {
                            let n = socket.read(&mut chunk).await.unwrap_or(0);
                            if n == 0 {
                                return;
                            }
                            buf.extend_from_slice(&chunk[..n]);
                            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                                break pos + 4;
                            }
                        };

                        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
                        let header = |name: &str| {
                            head.lines().skip(1).find_map(|line| {
                                let (key, value) = line.split_once(':')?;
                                key.trim()
                                    .eq_ignore_ascii_case(name)
                                    .then(|| value.trim().to_string())
                            })
                        };
                        let content_length: usize = header("content-length")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);

                        while buf.len() < head_end + content_length {
                            let n = socket.read(&mut chunk).await.unwrap_or(0);
                            if n == 0 {
                                break;
                            }
                            buf.extend_from_slice(&chunk[..n]);
                        }

                        let end = buf.len().min(head_end + content_length);
                        let payload = format!(
                            "{}\nhost: {}\nbody: {}",
                            head.lines().next().unwrap_or_default(),
                            header("host").unwrap_or_default(),
                            String::from_utf8_lossy(&buf[head_end..end]),
                        );

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Delegate: echo\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            payload.len(),
                            payload
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock delegate that waits `delay` after reading the request head
/// before answering `200 slow`.
pub async fn start_slow_backend(delay: std::time::Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                tokio::time::sleep(delay).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nslow",
                    )
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
