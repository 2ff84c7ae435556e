//! Wallet connection subsystem.
//!
//! # Data Flow
//! ```text
//! user picks a provider
//!     → connector.rs (strategy.rs: request accounts → signer → list accounts)
//!     → chain id read, record committed to the store
//!     → sync.rs attaches provider listeners
//!     → accountsChanged / chainChanged rewrite the record in place
//!
//! disconnect
//!     → listeners detached (same handler references)
//!     → record cleared
//! ```
//!
//! # Design Decisions
//! - Connecting never fails; a degraded record is still a connection
//! - Chain switches update the store optimistically
//! - No automatic reconnection when a wallet goes away on its own

pub mod connector;
pub mod strategy;
pub mod sync;

pub use connector::{read_chain_id, WalletConnector};
pub use strategy::{default_strategies, AccountStrategy, ListAccounts, RequestAccounts, SignerAddress};
pub use sync::EventSync;
