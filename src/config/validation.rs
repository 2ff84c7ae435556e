//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Wallet identity: names present, uuids and rdns unique
//! - Value ranges: poll interval > 0, chain ids > 0, parsable addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, WalletTransport};
use crate::discovery::announcer::wallet_uuid;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wallets[{index}]: name must not be empty")]
    EmptyWalletName { index: usize },

    #[error("wallets[{index}]: duplicate uuid {uuid}")]
    DuplicateUuid { index: usize, uuid: String },

    #[error("wallets[{index}]: duplicate rdns {rdns}")]
    DuplicateRdns { index: usize, rdns: String },

    #[error("wallets[{index}]: invalid rpc_url {url}: {reason}")]
    InvalidRpcUrl { index: usize, url: String, reason: String },

    #[error("wallets[{index}]: chain_id must be greater than zero")]
    ZeroChainId { index: usize },

    #[error("connection.poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("observability.log_level {0} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address {0} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.connection.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut uuids = HashSet::new();
    let mut rdns_seen = HashSet::new();
    for (index, wallet) in config.wallets.iter().enumerate() {
        if wallet.name.trim().is_empty() {
            errors.push(ValidationError::EmptyWalletName { index });
        }

        let uuid = wallet_uuid(wallet);
        if !uuids.insert(uuid.clone()) {
            errors.push(ValidationError::DuplicateUuid { index, uuid });
        }

        if !wallet.rdns.is_empty() && !rdns_seen.insert(wallet.rdns.clone()) {
            errors.push(ValidationError::DuplicateRdns {
                index,
                rdns: wallet.rdns.clone(),
            });
        }

        match &wallet.transport {
            WalletTransport::Memory { chain_id, .. } => {
                if *chain_id == 0 {
                    errors.push(ValidationError::ZeroChainId { index });
                }
            }
            WalletTransport::Http { rpc_url } => {
                if let Err(e) = rpc_url.parse::<url::Url>() {
                    errors.push(ValidationError::InvalidRpcUrl {
                        index,
                        url: rpc_url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
