//! Metrics definitions for the wallet service.
//!
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "connection_attempts_total",
        "Total number of chain connection handshakes started"
    );
    describe_counter!(
        "connections_established_total",
        "Total number of chain connections that reached the ready state"
    );
    describe_counter!(
        "balance_fetches_total",
        "Total number of successful balance fetches"
    );
    describe_counter!(
        "chain_query_errors_total",
        "Total number of failed chain queries"
    );
    describe_counter!(
        "transfers_submitted_total",
        "Total number of transfers submitted and finalized"
    );
    describe_histogram!(
        "balance_fetch_duration_seconds",
        "Time taken to fetch a balance snapshot in seconds"
    );
}

/// Record the start of a connection handshake.
pub fn record_connection_attempt() {
    counter!("connection_attempts_total").increment(1);
}

/// Record a connection reaching the ready state.
pub fn record_connection_established() {
    counter!("connections_established_total").increment(1);
}

/// Record a successful balance fetch.
pub fn record_balance_fetch() {
    counter!("balance_fetches_total").increment(1);
}

/// Record a failed chain query.
///
/// # Arguments
/// * `operation` - The operation that failed ("connect", "balances", "transfer")
pub fn record_chain_query_error(operation: &str) {
    counter!("chain_query_errors_total", "operation" => operation.to_string()).increment(1);
}

/// Record a finalized transfer.
pub fn record_transfer_submitted() {
    counter!("transfers_submitted_total").increment(1);
}

/// A timer that records balance fetch duration when dropped.
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    /// Start a new fetch timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        histogram!("balance_fetch_duration_seconds").record(duration);
    }
}
