//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! connection workflow
//!     → browser.rs (typed wrapper, signer lookup)
//!     → eip1193.rs (request / on / removeListener)
//!     → memory.rs | http.rs (concrete wallets)
//!
//! wallet-side change
//!     → emitter.rs (dispatch to registered handlers)
//!     → listeners.rs (guard that detaches them again)
//! ```
//!
//! # Design Decisions
//! - Responses are decoded per method in rpc.rs, never sniffed ad hoc
//! - Handler identity is the `Arc` pointer; removal needs the original
//! - No timeouts: a wallet waiting on the user suspends the caller

pub mod browser;
pub mod eip1193;
pub mod emitter;
pub mod http;
pub mod listeners;
pub mod memory;
pub mod rpc;
pub mod types;

pub use browser::{BrowserProvider, JsonRpcSigner};
pub use eip1193::Eip1193Provider;
pub use http::HttpProvider;
pub use listeners::ListenerGuard;
pub use memory::MemoryProvider;
pub use rpc::RpcMethod;
pub use types::{
    ChainId, EventHandler, ProviderError, ProviderEvent, ProviderEventKind, ProviderResult,
    RequestArguments,
};
