//! Metrics collection and exposition.
//!
//! # Metrics
//! - `skillshare_requests_total` (counter): requests by method, status, route kind
//! - `skillshare_request_duration_seconds` (histogram): latency distribution
//! - `skillshare_pending_waiters` (gauge): long polls currently held open
//! - `skillshare_waiters_resolved_total` (counter): by outcome
//!   (changed, timeout, abandoned, closed)
//! - `skillshare_talks_version` (gauge): current talks version
//! - `skillshare_glossary_entries` (gauge): glossary size
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op (tests, metrics disabled)
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    metrics::counter!(
        "skillshare_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route
    )
    .increment(1);
    metrics::histogram!("skillshare_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_pending_waiters(count: usize) {
    metrics::gauge!("skillshare_pending_waiters").set(count as f64);
}

pub fn record_waiters_resolved(outcome: &'static str, count: usize) {
    metrics::counter!("skillshare_waiters_resolved_total", "outcome" => outcome).increment(count as u64);
}

pub fn record_talks_version(version: u64) {
    metrics::gauge!("skillshare_talks_version").set(version as f64);
}

pub fn record_glossary_size(entries: usize) {
    metrics::gauge!("skillshare_glossary_entries").set(entries as f64);
}
