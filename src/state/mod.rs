//! Connection state store.
//!
//! # Data Flow
//! ```text
//! registry snapshot ──→ wallets cell ──→ views
//! connect/disconnect ─→ connected cell ─→ event sync, views
//! provider events ────↗
//! ```
//!
//! # Design Decisions
//! - One explicit store object, handed to whoever needs it (no globals)
//! - Cells hold values; invariants belong to the writers
//! - Subscribers run synchronously after each write

pub mod cell;
pub mod store;

pub use cell::{StateCell, Subscription};
pub use store::{ConnectedWallet, WalletStore};
