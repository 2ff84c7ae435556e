//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML file.
//! Every section has defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Page metadata.
    pub app: AppMetadata,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Connection workflow settings.
    pub connection: ConnectionConfig,

    /// Wallets announced to the provider registry.
    pub wallets: Vec<WalletConfig>,
}

/// Page metadata shown by the shell.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppMetadata {
    pub title: String,
    pub description: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            title: "My safe".to_string(),
            description: "A simple bank dApp built on base".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Connection workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// How often node-backed wallets are polled for account/chain changes.
    pub poll_interval_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4000,
        }
    }
}

/// One wallet to announce.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WalletConfig {
    /// Display name.
    pub name: String,

    /// Reverse-DNS identifier.
    #[serde(default)]
    pub rdns: String,

    /// Icon data URI or URL.
    #[serde(default)]
    pub icon: String,

    /// Fixed announcement uuid. Derived from rdns (or name) when absent.
    #[serde(default)]
    pub uuid: Option<String>,

    /// How the wallet is reached.
    pub transport: WalletTransport,
}

/// Wallet backend.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletTransport {
    /// In-process wallet holding fixed accounts.
    Memory {
        #[serde(default)]
        accounts: Vec<String>,
        #[serde(default = "default_chain_id")]
        chain_id: u64,
    },
    /// JSON-RPC node reached over HTTP.
    Http { rpc_url: String },
}

fn default_chain_id() -> u64 {
    // Base mainnet.
    8453
}
