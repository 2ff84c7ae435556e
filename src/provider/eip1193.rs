//! The EIP-1193 provider boundary.

use async_trait::async_trait;
use serde_json::Value;

use crate::provider::types::{EventHandler, ProviderEventKind, ProviderResult, RequestArguments};

/// A wallet provider as injected into the page.
///
/// Requests may suspend indefinitely while the wallet waits for the user;
/// nothing on this boundary imposes a timeout.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Dispatch a single `{ method, params }` request.
    async fn request(&self, args: RequestArguments) -> ProviderResult<Value>;

    /// Register `handler` for `event`.
    fn on(&self, event: ProviderEventKind, handler: EventHandler);

    /// Remove a previously registered handler.
    ///
    /// Matches by identity. Returns whether a registration was removed.
    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler) -> bool;

    /// Whether `remove_listener` is implemented at all.
    fn supports_listener_removal(&self) -> bool {
        true
    }
}
