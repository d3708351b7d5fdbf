//! Metrics collection and exposition.
//!
//! # Metrics
//! - `crosspay_http_requests_total` (counter): requests by route, status
//! - `crosspay_http_request_duration_seconds` (histogram): latency distribution
//! - `crosspay_payments_submitted_total` (counter): submissions by path
//! - `crosspay_payments_failed_total` (counter): failures by error code
//! - `crosspay_confirmations_total` (counter): watch outcomes
//! - `crosspay_rpc_healthy` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a served HTTP request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("crosspay_http_requests_total", &labels).increment(1);
    ::metrics::histogram!("crosspay_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a payment handed to a wallet.
pub fn record_payment_submitted(path: &'static str) {
    ::metrics::counter!("crosspay_payments_submitted_total", "path" => path).increment(1);
}

/// Record a failed payment submission.
pub fn record_payment_failed(code: &'static str) {
    ::metrics::counter!("crosspay_payments_failed_total", "code" => code).increment(1);
}

/// Record the terminal outcome of a confirmation watch.
pub fn record_confirmation(outcome: &'static str) {
    ::metrics::counter!("crosspay_confirmations_total", "outcome" => outcome).increment(1);
}

/// Record RPC reachability.
pub fn record_rpc_health(healthy: bool) {
    ::metrics::gauge!("crosspay_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
