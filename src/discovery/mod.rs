//! Wallet discovery subsystem (EIP-6963).
//!
//! # Data Flow
//! ```text
//! configured wallets (announcer.rs)   async announcement stream
//!              \                        /
//!               → registry.rs (ordered, unique by uuid)
//!               → subscribers (event sync copies snapshots into the store)
//! ```
//!
//! # Design Decisions
//! - Discovery is passive; connecting is someone else's job
//! - A repeated uuid replaces the earlier announcement in place

pub mod announcer;
pub mod registry;
pub mod types;

pub use announcer::ConfiguredWallets;
pub use registry::{AnnouncementSource, ProviderRegistry};
pub use types::{ProviderDetail, ProviderInfo};
