//! Metrics collection and exposition.
//!
//! # Metrics
//! - `atm_transactions_total` (counter): attempts by operation, outcome
//! - `atm_balance_fetch_total` (counter): balance reads by result
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing unless `init_metrics` ran.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a finished deposit or withdrawal attempt.
pub fn record_transaction(operation: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "atm_transactions_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Count a balance read.
pub fn record_balance_fetch(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    ::metrics::counter!("atm_balance_fetch_total", "result" => result).increment(1);
}
