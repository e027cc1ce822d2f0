//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, rule
//! - `gateway_request_duration_seconds` (histogram): latency by rule
//! - `gateway_resolutions_total` (counter): store/cache outcomes by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, rule: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "rule" => rule
    )
    .increment(1);

    metrics::histogram!("gateway_request_duration_seconds", "rule" => rule)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a package or list resolution.
pub fn record_resolution(kind: &'static str, outcome: &'static str) {
    metrics::counter!("gateway_resolutions_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
}
