//! Metrics collection and exposition.
//!
//! # Metrics
//! - `neo_proxy_requests_total` (counter): requests by status
//! - `neo_proxy_request_duration_seconds` (histogram): serving latency
//! - `neo_proxy_rate_limited_total` (counter): rejected requests
//! - `neo_proxy_upstream_failures_total` (counter): classified by code
//! - `neo_client_cache_total` (counter): client cache dispositions

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a served request with its final status.
pub fn record_request(status: u16, start: Instant) {
    counter!("neo_proxy_requests_total", "status" => status.to_string()).increment(1);
    histogram!("neo_proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an admission-control rejection.
pub fn record_rate_limited() {
    counter!("neo_proxy_rate_limited_total").increment(1);
}

/// Record a classified upstream failure.
pub fn record_upstream_failure(code: &'static str) {
    counter!("neo_proxy_upstream_failures_total", "code" => code).increment(1);
}

/// Record a client cache disposition ("hit", "miss", "stale").
pub fn record_cache_event(disposition: &'static str) {
    counter!("neo_client_cache_total", "disposition" => disposition).increment(1);
}
