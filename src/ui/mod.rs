//! Presentation layer.
//!
//! View-models only. Every view reads from the store through the connector
//! and renders a snapshot; the binary prints those snapshots as text.

pub mod input;
pub mod layout;
pub mod modal;

pub use input::{AppInput, FieldMeta, FormikInput, Indicator, Input};
pub use layout::PageShell;
pub use modal::{ConnectWalletModal, ConnectedSummary, ModalView, WalletConnect, WalletEntry};
