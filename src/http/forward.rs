//! Delegation to the local application server.
//!
//! # Responsibilities
//! - Rewrite the request target to the local delegate
//! - Relay the request and stream the response back unchanged
//!
//! # Design Decisions
//! - Plain relay: no classification rule runs on this path
//! - The original `Host` header is preserved for the delegate
//! - Bodies are streamed, never buffered
//! - Delegate failures surface as 502 Bad Gateway

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Uri};
use axum::response::Response;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::http::request::RequestIdExt;
use crate::http::response;

/// Relays requests to a fixed local HTTP endpoint.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl Forwarder {
    /// Create a forwarder targeting `authority` (host:port).
    pub fn new(authority: Authority, connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self { client, authority }
    }

    /// Point `uri` at the delegate, keeping path and query.
    pub fn rewrite_uri(&self, uri: &Uri) -> Uri {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
    }

    /// Relay `request` to the delegate.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let request_id = request.request_id().to_string();
        let (mut parts, body) = request.into_parts();

        parts.uri = self.rewrite_uri(&parts.uri);
        response::strip_hop_by_hop(&mut parts.headers);

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            uri = %parts.uri,
            "Delegating request"
        );

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(upstream) => {
                let (mut parts, body) = upstream.into_parts();
                response::strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    delegate = %self.authority,
                    error = %e,
                    "Delegate request failed"
                );
                response::bad_gateway()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarder() -> Forwarder {
        Forwarder::new(Authority::from_static("127.0.0.1:3001"), Duration::from_secs(1))
    }

    #[test]
    fn rewrite_keeps_path_and_query() {
        let uri: Uri = "/packages/search/x?q=1".parse().unwrap();
        assert_eq!(
            forwarder().rewrite_uri(&uri).to_string(),
            "http://127.0.0.1:3001/packages/search/x?q=1"
        );
    }

    #[test]
    fn rewrite_replaces_absolute_target() {
        let uri: Uri = "https://registry.bower.io/packages".parse().unwrap();
        assert_eq!(
            forwarder().rewrite_uri(&uri).to_string(),
            "http://127.0.0.1:3001/packages"
        );
    }

    #[tokio::test]
    async fn unreachable_delegate_is_bad_gateway() {
        // Port 9 (discard) is not expected to accept connections locally.
        let forwarder = Forwarder::new(Authority::from_static("127.0.0.1:9"), Duration::from_secs(1));
        let request = Request::builder()
            .method("POST")
            .uri("/packages")
            .body(Body::from("name=x"))
            .unwrap();

        let response = forwarder.forward(request).await;
        assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
