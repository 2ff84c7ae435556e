//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → startup wires wallets, logging, metrics from it
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → wallets are re-announced to the registry
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file (or no file) works
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload keeps the running configuration

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, AppMetadata, ConnectionConfig, ObservabilityConfig, WalletConfig, WalletTransport};
