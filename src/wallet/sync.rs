//! Keeps the store in step with the registry and the connected provider.
//!
//! # Responsibilities
//! - Mirror every registry snapshot into the store's wallet list
//! - Attach `accountsChanged` / `chainChanged` handlers when a wallet gets
//!   connected, detach them when it goes away or is replaced
//! - Release everything when the sync is dropped
//!
//! The handlers registered on the provider are the ones kept in the
//! [`ListenerGuard`], so detaching removes exactly what was attached.

use std::sync::{Arc, Weak};

use crate::discovery::ProviderRegistry;
use crate::provider::{
    ChainId, Eip1193Provider, EventHandler, ListenerGuard, ProviderEvent, ProviderEventKind,
};
use crate::state::{ConnectedWallet, StateCell, Subscription, WalletStore};

/// Live binding between a registry, a store and the connected provider.
///
/// Mounting wires everything up; dropping tears it down, including the
/// provider listeners.
pub struct EventSync {
    store: WalletStore,
    subscriptions: Vec<Subscription>,
}

impl EventSync {
    /// Start syncing `store` with `registry`.
    ///
    /// The current registry snapshot is copied in immediately, and a wallet
    /// that is already connected gets its listeners right away.
    pub fn mount(store: WalletStore, registry: &ProviderRegistry) -> Self {
        store.wallets.set(registry.providers());
        let wallets = store.wallets.clone();
        let discovery = registry.subscribe(move |snapshot| wallets.set(snapshot.to_vec()));

        let sync_store = store.clone();
        let connection = store.connected.subscribe(move |_| reconcile(&sync_store));

        reconcile(&store);
        tracing::debug!("Event sync mounted");

        Self {
            store,
            subscriptions: vec![discovery, connection],
        }
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Whether provider listeners are currently attached.
    pub fn is_listening(&self) -> bool {
        self.store.has_listeners()
    }

    /// Tear down now instead of on drop.
    pub fn unmount(self) {}
}

impl Drop for EventSync {
    fn drop(&mut self) {
        // Subscriptions first, then listeners.
        self.subscriptions.clear();

        if let Some(guard) = self.store.take_listeners() {
            guard.dispose();
        }
        tracing::debug!("Event sync unmounted");
    }
}

impl std::fmt::Debug for EventSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSync")
            .field("listening", &self.is_listening())
            .finish()
    }
}

/// Bring the attached listeners in line with the record in the store.
///
/// Runs under the listener-slot lock and reads the record inside it, so
/// overlapping writes settle on the provider that was written last, not on
/// whichever notification finishes last.
fn reconcile(store: &WalletStore) {
    let mut slot = store.listener_slot();
    let current = store.connected.load();

    let Some(wallet) = (*current).as_ref() else {
        if let Some(guard) = slot.take() {
            guard.dispose();
        }
        return;
    };

    if slot
        .as_ref()
        .is_some_and(|guard| guard.is_attached_to(&wallet.provider))
    {
        return;
    }

    if let Some(stale) = slot.take() {
        stale.dispose();
    }

    *slot = Some(ListenerGuard::attach(
        wallet.provider.clone(),
        vec![
            (
                ProviderEventKind::AccountsChanged,
                accounts_handler(&store.connected, &wallet.provider),
            ),
            (
                ProviderEventKind::ChainChanged,
                chain_handler(&store.connected, &wallet.provider),
            ),
        ],
    ));
    tracing::debug!(wallet = %wallet.detail.info.name, "Listening to provider events");
}

/// Only touch the record while it still belongs to `source`.
fn apply<F>(connected: &StateCell<Option<ConnectedWallet>>, source: &Weak<dyn Eip1193Provider>, f: F)
where
    F: Fn(&ConnectedWallet) -> ConnectedWallet,
{
    let Some(source) = source.upgrade() else {
        return;
    };
    connected.update(|current| match current {
        Some(wallet) if wallet.uses_provider(&source) => Some(f(wallet)),
        other => other.clone(),
    });
}

fn accounts_handler(
    connected: &StateCell<Option<ConnectedWallet>>,
    provider: &Arc<dyn Eip1193Provider>,
) -> EventHandler {
    let connected = connected.clone();
    let source = Arc::downgrade(provider);
    Arc::new(move |event: &ProviderEvent| {
        if let ProviderEvent::AccountsChanged(accounts) = event {
            tracing::info!(account = accounts.first().map(String::as_str).unwrap_or("-"), "Accounts changed");
            apply(&connected, &source, |wallet| wallet.with_accounts(accounts.clone()));
        }
    })
}

fn chain_handler(
    connected: &StateCell<Option<ConnectedWallet>>,
    provider: &Arc<dyn Eip1193Provider>,
) -> EventHandler {
    let connected = connected.clone();
    let source = Arc::downgrade(provider);
    Arc::new(move |event: &ProviderEvent| {
        if let ProviderEvent::ChainChanged(raw) = event {
            match ChainId::from_hex(raw) {
                Ok(chain_id) => {
                    tracing::info!(chain_id = %chain_id, "Chain changed");
                    apply(&connected, &source, |wallet| wallet.with_chain(chain_id));
                }
                Err(e) => tracing::warn!(payload = %raw, error = %e, "Ignoring malformed chainChanged"),
            }
        }
    })
}
