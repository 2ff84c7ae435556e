//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define wallet connection metrics
//! - Expose a Prometheus-compatible endpoint when enabled
//!
//! # Metrics
//! - `wallet_connect_total` (counter): connect attempts by wallet, outcome
//! - `wallet_account_strategy_total` (counter): account strategy results by strategy, outcome
//! - `wallet_provider_events_total` (counter): provider events dispatched by event
//! - `wallet_chain_switch_total` (counter): chain switch requests by outcome
//! - `wallet_providers_discovered` (gauge): size of the provider registry
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and costs nothing without a recorder
//! - Outcome labels are a small fixed set

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// A connect attempt finished. `outcome` is `accounts` or `empty`.
pub fn record_connect(wallet: &str, outcome: &'static str) {
    counter!("wallet_connect_total", "wallet" => wallet.to_string(), "outcome" => outcome)
        .increment(1);
}

/// One account strategy ran. `outcome` is `found`, `empty` or `error`.
pub fn record_strategy(strategy: &'static str, outcome: &'static str) {
    counter!("wallet_account_strategy_total", "strategy" => strategy, "outcome" => outcome)
        .increment(1);
}

pub fn record_provider_event(event: &'static str) {
    counter!("wallet_provider_events_total", "event" => event).increment(1);
}

/// A chain switch finished. `outcome` is `ok` or `error`.
pub fn record_chain_switch(outcome: &'static str) {
    counter!("wallet_chain_switch_total", "outcome" => outcome).increment(1);
}

pub fn record_discovered(count: usize) {
    gauge!("wallet_providers_discovered").set(count as f64);
}
