//! Legacy traffic migration.
//!
//! Clients still pointed at the legacy host get a deprecation notice for
//! search, and a throttled permanent redirect to the canonical registry for
//! everything else. The throttle suspends only the requesting task.

use std::time::Duration;

use axum::http::Uri;
use axum::response::Response;

use crate::config::RegistryConfig;
use crate::http::response;

/// Respond to a request classified as migratable.
pub async fn respond(uri: &Uri, config: &RegistryConfig) -> Response {
    if uri.path().starts_with(&config.search_prefix) {
        return response::deprecation_notice(&config.deprecated_name, &config.deprecation_message);
    }

    tokio::time::sleep(Duration::from_secs(config.throttle_secs)).await;

    let location = redirect_location(&config.upstream_origin, uri);
    tracing::debug!(location = %location, "Redirecting legacy request");
    response::permanent_redirect(&location)
}

/// Upstream origin + original path + `?query` when the query is non-empty.
pub fn redirect_location(origin: &str, uri: &Uri) -> String {
    let mut target = format!("{}{}", origin, uri.path());
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    target
}
