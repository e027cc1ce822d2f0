//! Response construction.
//!
//! # Responsibilities
//! - Render resolved packages and the cached list with long-lived caching
//! - Render the deprecation notice and the migration redirect
//! - Map resolution errors to status codes without leaking detail
//! - Strip hop-by-hop headers from relayed messages
//!
//! # Design Decisions
//! - Packages are immutable once published: 7 day public cache
//! - Error bodies are fixed plain text; causes go to the log only

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::registry::{Package, ResolveError};

/// Cache directive for package and list responses.
pub const PACKAGE_CACHE_CONTROL: &str = "public, max-age=604800";

pub const NOT_FOUND_BODY: &str = "Package not found";
pub const INTERNAL_ERROR_BODY: &str = "Internal server error";

const HOP_BY_HOP: [header::HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HeaderName::from_static("keep-alive"),
];

fn json(status: StatusCode, body: impl Into<Body>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body.into(),
    )
        .into_response()
}

fn cacheable_json(body: impl Into<Body>) -> Response {
    let mut response = json(StatusCode::OK, body);
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(PACKAGE_CACHE_CONTROL),
    );
    response
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        body,
    )
        .into_response()
}

/// 200 with the package as JSON.
pub fn package(package: &Package) -> Response {
    match serde_json::to_vec(package) {
        Ok(body) => cacheable_json(body),
        Err(e) => {
            tracing::error!(package = %package.name, error = %e, "Failed to serialize package");
            internal_error()
        }
    }
}

/// 200 with the cached list bytes, unchanged.
pub fn package_list(body: Bytes) -> Response {
    cacheable_json(body)
}

/// 404 for an unknown package.
pub fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// 500 with a generic body.
pub fn internal_error() -> Response {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
}

/// Render a failed resolution.
pub fn resolve_error(err: &ResolveError) -> Response {
    match err {
        ResolveError::NotFound(_) => not_found(),
        ResolveError::Store(_) => internal_error(),
    }
}

/// 200 with a single synthetic record telling the client to upgrade.
pub fn deprecation_notice(name: &str, message: &str) -> Response {
    match serde_json::to_vec(&[Package::new(name, message)]) {
        Ok(body) => json(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize deprecation notice");
            internal_error()
        }
    }
}

/// 308 to `location`.
pub fn permanent_redirect(location: &str) -> Response {
    let mut response = json(StatusCode::PERMANENT_REDIRECT, Body::empty());
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(e) => {
            tracing::error!(location, error = %e, "Redirect target is not a valid header value");
            internal_error()
        }
    }
}

/// 502 when the delegate cannot be reached.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

/// 504 when a handler exceeds the request timeout.
pub fn gateway_timeout() -> Response {
    (StatusCode::GATEWAY_TIMEOUT, "Request timed out").into_response()
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<header::HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| header::HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("proxy-connection");
}
