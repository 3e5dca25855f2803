//! Prometheus metrics for the fund ledger.
//!
//! Recording functions are safe to call without an installed exporter; the
//! `metrics` facade drops samples until one is registered.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Latency buckets from 100us to 5s.
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP listener that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .set_buckets(LATENCY_BUCKETS)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(addr = %listen_addr, "Prometheus metrics exporter started");

    Ok(())
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Record a transaction submission.
///
/// # Arguments
///
/// * `transaction_type` - `purchase`, `sell` or `exchange`
/// * `status` - `accepted` or `rejected`
pub fn record_submission(transaction_type: &str, status: &str) {
    counter!(
        "ledger_transactions_submitted_total",
        "type" => transaction_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a settlement attempt outcome.
///
/// # Arguments
///
/// * `action` - `complete` or `cancel`
/// * `outcome` - `ok` or an error code
/// * `latency_seconds` - Time spent including conflict retries
pub fn record_settlement(action: &str, outcome: &str, latency_seconds: f64) {
    counter!(
        "ledger_settlements_total",
        "action" => action.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!("ledger_settlement_seconds", "action" => action.to_string())
        .record(latency_seconds);
}

/// Record a unit of work retried after a version conflict.
pub fn record_concurrency_retry(action: &str) {
    counter!("ledger_concurrency_retries_total", "action" => action.to_string()).increment(1);
}

// ============================================================================
// Matching Metrics
// ============================================================================

/// Record one matching cycle.
///
/// # Arguments
///
/// * `funds` - Fund groups examined
/// * `pairs` - Pairs created
/// * `latency_seconds` - Cycle duration
pub fn record_matching_cycle(funds: usize, pairs: usize, latency_seconds: f64) {
    counter!("matching_cycles_total").increment(1);
    counter!("matching_pairs_created_total").increment(pairs as u64);
    #[allow(clippy::cast_precision_loss)]
    histogram!("matching_funds_per_cycle").record(funds as f64);
    histogram!("matching_cycle_seconds").record(latency_seconds);
}

/// Record a pair dispatch outcome.
///
/// # Arguments
///
/// * `outcome` - `sent`, `already_sent`, `failed` or `error`
pub fn record_dispatch_outcome(outcome: &str) {
    counter!("matching_dispatch_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record one call to the execution venue.
///
/// # Arguments
///
/// * `gateway` - Adapter name (e.g., "http", "paper")
/// * `status` - `accepted`, `rejected` or an error kind
/// * `latency_seconds` - Round-trip time
pub fn record_gateway_attempt(gateway: &str, status: &str, latency_seconds: f64) {
    counter!(
        "gateway_attempts_total",
        "gateway" => gateway.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("gateway_latency_seconds", "gateway" => gateway.to_string())
        .record(latency_seconds);
}
