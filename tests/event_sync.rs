//! Provider listener lifecycle.

use std::sync::Arc;

use mysafe::provider::{
    Eip1193Provider, EventHandler, MemoryProvider, ProviderEvent, ProviderEventKind,
};
use mysafe::{ChainId, EventSync};

mod common;
use common::{detail, memory_wallet, Harness};

fn listeners(wallet: &MemoryProvider) -> (usize, usize) {
    (
        wallet.listener_count(ProviderEventKind::AccountsChanged),
        wallet.listener_count(ProviderEventKind::ChainChanged),
    )
}

#[tokio::test]
async fn test_connect_attaches_one_listener_per_event() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);

    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;
    assert_eq!(listeners(&wallet), (1, 1));

    // Field updates do not re-attach.
    wallet.emit(ProviderEvent::AccountsChanged(vec!["0xBBB".into()]));
    wallet.set_chain(5);
    assert_eq!(listeners(&wallet), (1, 1));
    assert!(h.sync.is_listening());
}

#[tokio::test]
async fn test_disconnect_detaches_the_registered_handlers() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;

    h.connector.disconnect();

    assert_eq!(listeners(&wallet), (0, 0));
    assert!(!h.sync.is_listening());
    assert_eq!(wallet.emit(ProviderEvent::AccountsChanged(vec!["0xCCC".into()])), 0);
}

#[tokio::test]
async fn test_clearing_the_record_directly_also_detaches() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;

    h.store.connected.set(None);

    assert_eq!(listeners(&wallet), (0, 0));
}

#[tokio::test]
async fn test_removal_with_fresh_handlers_leaves_listeners_attached() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;

    // What a disconnect that builds new no-op callbacks would do.
    let fresh: EventHandler = Arc::new(|_: &ProviderEvent| {});
    assert!(!wallet.remove_listener(ProviderEventKind::AccountsChanged, &fresh));
    assert!(!wallet.remove_listener(ProviderEventKind::ChainChanged, &fresh));
    h.store.connected.update(|_| None);

    // The sync layer still detached its own handlers when the record cleared.
    assert_eq!(listeners(&wallet), (0, 0));
}

#[tokio::test]
async fn test_removal_with_stored_handlers_detaches() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;

    let guard = h.store.take_listeners().expect("listeners attached");
    let on_accounts = guard
        .handler(ProviderEventKind::AccountsChanged)
        .cloned()
        .unwrap();
    assert!(wallet.remove_listener(ProviderEventKind::AccountsChanged, &on_accounts));
    assert_eq!(listeners(&wallet), (0, 1));

    // The guard removes what is left and reports it.
    assert_eq!(guard.dispose(), 1);
    assert_eq!(listeners(&wallet), (0, 0));
}

#[tokio::test]
async fn test_wallet_without_listener_removal() {
    let h = Harness::new();
    let wallet = Arc::new(MemoryProvider::new(vec!["0xAAA".into()], 1).without_listener_removal());
    h.connector.connect(&detail("w", "Sticky", wallet.clone())).await;

    h.connector.disconnect();

    assert!(h.store.connected.get().is_none());
    assert_eq!(listeners(&wallet), (1, 1));
}

#[tokio::test]
async fn test_switching_wallets_moves_listeners() {
    let h = Harness::new();
    let first = memory_wallet(&["0xAAA"], 1);
    let second = memory_wallet(&["0xBBB"], 10);

    h.connector.connect(&detail("a", "First", first.clone())).await;
    h.connector.connect(&detail("b", "Second", second.clone())).await;

    assert_eq!(listeners(&first), (0, 0));
    assert_eq!(listeners(&second), (1, 1));

    second.set_chain(8453);
    assert_eq!(h.store.connected.get().unwrap().chain_id, ChainId(8453));
}

#[tokio::test]
async fn test_unmount_releases_listeners_and_subscriptions() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;
    let Harness {
        registry,
        store,
        sync,
        ..
    } = h;

    sync.unmount();

    assert_eq!(listeners(&wallet), (0, 0));
    assert_eq!(store.connected.subscriber_count(), 0);
    // Discovery no longer reaches the store.
    registry.announce(detail("late", "Late", memory_wallet(&[], 1)));
    assert!(store.wallets.get().is_empty());
}

#[tokio::test]
async fn test_remount_picks_up_existing_connection() {
    let h = Harness::new();
    let wallet = memory_wallet(&["0xAAA"], 1);
    h.connector.connect(&detail("w", "Dev", wallet.clone())).await;
    let Harness {
        registry,
        store,
        sync,
        ..
    } = h;
    sync.unmount();

    let remounted = EventSync::mount(store.clone(), &registry);

    assert!(remounted.is_listening());
    assert_eq!(listeners(&wallet), (1, 1));
    wallet.emit(ProviderEvent::AccountsChanged(vec!["0xDDD".into()]));
    assert_eq!(store.connected.get().unwrap().accounts, vec!["0xDDD".to_string()]);
}
