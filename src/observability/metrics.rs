//! Metrics collection and exposition.
//!
//! # Metrics
//! - `eth_fetcher_resolutions_total` (counter): resolutions by outcome
//! - `eth_fetcher_chain_calls_total` (counter): node calls by method and result
//! - `eth_fetcher_events_total` (counter): ingested events by result
//! - `eth_fetcher_submissions_total` (counter): submissions by result
//! - `eth_fetcher_node_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("eth_fetcher_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_chain_call(method: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("eth_fetcher_chain_calls_total", "method" => method, "result" => result)
        .increment(1);
}

pub fn record_event(result: &'static str) {
    metrics::counter!("eth_fetcher_events_total", "result" => result).increment(1);
}

pub fn record_submission(result: &'static str) {
    metrics::counter!("eth_fetcher_submissions_total", "result" => result).increment(1);
}

pub fn record_node_health(healthy: bool) {
    metrics::gauge!("eth_fetcher_node_health").set(if healthy { 1.0 } else { 0.0 });
}
