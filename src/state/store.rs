//! Wallet connection state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::discovery::ProviderDetail;
use crate::provider::{BrowserProvider, ChainId, Eip1193Provider, ListenerGuard};
use crate::state::cell::StateCell;

/// The active wallet connection.
#[derive(Clone)]
pub struct ConnectedWallet {
    /// Announcement the connection was made from.
    pub detail: ProviderDetail,
    /// Raw provider handle.
    pub provider: Arc<dyn Eip1193Provider>,
    /// Typed wrapper over `provider`.
    pub browser_provider: BrowserProvider,
    /// Account addresses, primary first. May be empty.
    pub accounts: Vec<String>,
    /// Chain the wallet points at; `0` when it could not be read.
    pub chain_id: ChainId,
}

impl ConnectedWallet {
    pub fn primary_account(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }

    /// Copy with the account list replaced.
    pub fn with_accounts(&self, accounts: Vec<String>) -> Self {
        Self {
            accounts,
            ..self.clone()
        }
    }

    /// Copy with the chain replaced.
    pub fn with_chain(&self, chain_id: ChainId) -> Self {
        Self {
            chain_id,
            ..self.clone()
        }
    }

    /// Whether this connection runs over `provider`.
    pub fn uses_provider(&self, provider: &Arc<dyn Eip1193Provider>) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.provider) as *const (),
            Arc::as_ptr(provider) as *const (),
        )
    }
}

impl std::fmt::Debug for ConnectedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedWallet")
            .field("wallet", &self.detail.info.name)
            .field("accounts", &self.accounts)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Connection state shared by the workflow, the event sync layer and views.
///
/// Cheap to clone; clones observe the same state.
#[derive(Clone, Default)]
pub struct WalletStore {
    /// Discovered providers, mirrored from the registry.
    pub wallets: StateCell<Vec<ProviderDetail>>,
    /// At most one connected wallet.
    pub connected: StateCell<Option<ConnectedWallet>>,
    listeners: Arc<Mutex<Option<ListenerGuard>>>,
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard of the currently attached provider listeners.
    pub fn take_listeners(&self) -> Option<ListenerGuard> {
        self.listener_slot().take()
    }

    pub fn has_listeners(&self) -> bool {
        self.listener_slot().is_some()
    }

    /// Lock the listener slot.
    ///
    /// Whoever holds the lock decides which provider the listeners sit on;
    /// attach and detach while holding it.
    pub fn listener_slot(&self) -> MutexGuard<'_, Option<ListenerGuard>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for WalletStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletStore")
            .field("wallets", &self.wallets.load().len())
            .field("connected", &self.connected.load())
            .field("listeners", &self.has_listeners())
            .finish()
    }
}
