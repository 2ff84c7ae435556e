//! mysafe wallet-connection library
//!
//! Discovers injected wallet providers, connects to the one the user picks
//! and keeps the connection state in step with the wallet's own events.

// Core subsystems
pub mod discovery;
pub mod provider;
pub mod state;
pub mod wallet;

// Presentation
pub mod ui;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use discovery::{ProviderDetail, ProviderInfo, ProviderRegistry};
pub use lifecycle::{App, Shutdown};
pub use provider::{ChainId, Eip1193Provider, ProviderError, ProviderResult};
pub use state::{ConnectedWallet, WalletStore};
pub use wallet::{EventSync, WalletConnector};
