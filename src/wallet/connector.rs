//! The connection workflow.
//!
//! # Responsibilities
//! - Connect to a chosen provider, best effort: walk the account strategies,
//!   read the chain, always commit a record
//! - Disconnect, detaching provider listeners first
//! - Switch chains, updating the store optimistically
//!
//! Nothing here imposes a timeout. A wallet waiting on the user suspends the
//! calling task until the user answers.

use crate::discovery::ProviderDetail;
use crate::observability::metrics;
use crate::provider::rpc::{decode, switch_chain_request, ChainIdResponse, RpcMethod};
use crate::provider::{BrowserProvider, ChainId, Eip1193Provider, ProviderResult};
use crate::state::{ConnectedWallet, WalletStore};
use crate::wallet::strategy::{default_strategies, AccountStrategy};

/// Drives connect, disconnect and chain switches against a [`WalletStore`].
pub struct WalletConnector {
    store: WalletStore,
    strategies: Vec<Box<dyn AccountStrategy>>,
}

impl WalletConnector {
    /// Connector using the standard strategy order.
    pub fn new(store: WalletStore) -> Self {
        Self::with_strategies(store, default_strategies())
    }

    pub fn with_strategies(store: WalletStore, strategies: Vec<Box<dyn AccountStrategy>>) -> Self {
        Self { store, strategies }
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    /// Names of the configured strategies, in the order they run.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Connect to `detail` and commit the result.
    ///
    /// Never fails: provider errors are logged and degrade the record
    /// (no accounts, chain `0`) instead of aborting. A previous connection
    /// is replaced.
    pub async fn connect(&self, detail: &ProviderDetail) -> ConnectedWallet {
        let provider = detail.provider.clone();
        let browser_provider = BrowserProvider::new(provider.clone());

        tracing::info!(wallet = %detail.info.name, uuid = %detail.info.uuid, "Connecting wallet");

        let accounts = self.discover_accounts(&*provider, &browser_provider).await;
        let chain_id = read_chain_id(&*provider).await;

        let wallet = ConnectedWallet {
            detail: detail.clone(),
            provider,
            browser_provider,
            accounts,
            chain_id,
        };

        let outcome = if wallet.accounts.is_empty() {
            tracing::warn!(wallet = %detail.info.name, "Connected without any account");
            "empty"
        } else {
            "accounts"
        };
        metrics::record_connect(&detail.info.name, outcome);
        tracing::info!(
            wallet = %detail.info.name,
            account = wallet.primary_account().unwrap_or("-"),
            accounts = wallet.accounts.len(),
            chain_id = %wallet.chain_id,
            "Wallet connected"
        );

        self.store.connected.set(Some(wallet.clone()));
        wallet
    }

    /// Forget the active connection.
    ///
    /// Listeners are detached first when the provider can remove them; the
    /// record is cleared either way.
    pub fn disconnect(&self) {
        if let Some(guard) = self.store.take_listeners() {
            guard.dispose();
        }
        if let Some(wallet) = self.store.connected.load().as_ref() {
            tracing::info!(wallet = %wallet.detail.info.name, "Wallet disconnected");
        }
        self.store.connected.set(None);
    }

    /// Ask the connected wallet to switch to `chain_id`.
    ///
    /// Does nothing when disconnected. Once the wallet accepts, the store
    /// takes the requested chain without waiting for a `chainChanged` event;
    /// a later event still wins. A rejected request is returned unchanged
    /// and leaves the store alone.
    pub async fn switch_chain(&self, chain_id: impl Into<ChainId>) -> ProviderResult<()> {
        let chain_id = chain_id.into();
        let Some(wallet) = self.store.connected.get() else {
            tracing::debug!(chain_id = %chain_id, "Chain switch ignored, no wallet connected");
            return Ok(());
        };

        tracing::info!(wallet = %wallet.detail.info.name, chain_id = %chain_id, "Switching chain");
        if let Err(e) = wallet.provider.request(switch_chain_request(chain_id)).await {
            tracing::warn!(chain_id = %chain_id, error = %e, "Chain switch rejected");
            metrics::record_chain_switch("error");
            return Err(e);
        }
        metrics::record_chain_switch("ok");

        self.store
            .connected
            .update(|current| current.as_ref().map(|w| w.with_chain(chain_id)));
        Ok(())
    }

    /// Providers currently known to the store.
    pub fn wallets(&self) -> Vec<ProviderDetail> {
        self.store.wallets.get()
    }

    /// The active connection, if any.
    pub fn wallet(&self) -> Option<ConnectedWallet> {
        self.store.connected.get()
    }

    pub fn is_connected(&self) -> bool {
        self.store.connected.load().is_some()
    }

    async fn discover_accounts(
        &self,
        provider: &dyn Eip1193Provider,
        browser: &BrowserProvider,
    ) -> Vec<String> {
        for strategy in &self.strategies {
            match strategy.discover(provider, browser).await {
                Ok(accounts) if !accounts.is_empty() => {
                    tracing::debug!(strategy = strategy.name(), accounts = accounts.len(), "Accounts found");
                    metrics::record_strategy(strategy.name(), "found");
                    return accounts;
                }
                Ok(_) => {
                    tracing::debug!(strategy = strategy.name(), "No accounts, trying next strategy");
                    metrics::record_strategy(strategy.name(), "empty");
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "Account strategy failed");
                    metrics::record_strategy(strategy.name(), "error");
                }
            }
        }
        Vec::new()
    }
}

impl std::fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnector")
            .field("store", &self.store)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// Read the wallet's chain, `0` if it cannot be read.
pub async fn read_chain_id(provider: &dyn Eip1193Provider) -> ChainId {
    let result = match provider.request(RpcMethod::ChainId.request()).await {
        Ok(value) => decode::<ChainIdResponse>(RpcMethod::ChainId, value)
            .and_then(|response| response.chain_id()),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not read chain id, assuming 0");
        ChainId(0)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::discovery::ProviderInfo;
    use crate::provider::{MemoryProvider, ProviderError};

    fn detail(wallet: &Arc<MemoryProvider>) -> ProviderDetail {
        ProviderDetail::new(
            ProviderInfo {
                uuid: "mem".into(),
                name: "Memory".into(),
                icon: String::new(),
                rdns: "dev.mysafe.memory".into(),
            },
            wallet.clone(),
        )
    }

    #[tokio::test]
    async fn test_read_chain_id_forms() {
        let wallet = MemoryProvider::new(vec![], 8453);
        assert_eq!(read_chain_id(&wallet).await, ChainId(8453));

        wallet.respond(RpcMethod::ChainId, json!(137));
        assert_eq!(read_chain_id(&wallet).await, ChainId(137));

        wallet.respond(RpcMethod::ChainId, json!("0xzz"));
        assert_eq!(read_chain_id(&wallet).await, ChainId(0));

        wallet.fail(RpcMethod::ChainId, ProviderError::Unsupported("eth_chainId".into()));
        assert_eq!(read_chain_id(&wallet).await, ChainId(0));
    }

    #[tokio::test]
    async fn test_first_strategy_wins() {
        let wallet = Arc::new(MemoryProvider::new(vec!["0x1".into()], 1));
        let connector = WalletConnector::new(WalletStore::new());

        let connected = connector.connect(&detail(&wallet)).await;

        assert_eq!(connected.accounts, vec!["0x1"]);
        assert!(wallet.requests_for(RpcMethod::Accounts).is_empty());
        assert!(connector.is_connected());
    }

    #[tokio::test]
    async fn test_connect_replaces_previous_connection() {
        let first = Arc::new(MemoryProvider::new(vec!["0x1".into()], 1));
        let second = Arc::new(MemoryProvider::new(vec!["0x2".into()], 10));
        let connector = WalletConnector::new(WalletStore::new());

        connector.connect(&detail(&first)).await;
        connector.connect(&detail(&second)).await;

        let wallet = connector.wallet().unwrap();
        assert_eq!(wallet.accounts, vec!["0x2"]);
        assert_eq!(wallet.chain_id, ChainId(10));
    }

    #[tokio::test]
    async fn test_custom_strategy_list() {
        let wallet = Arc::new(MemoryProvider::new(vec!["0x1".into()], 1));
        let connector = WalletConnector::with_strategies(
            WalletStore::new(),
            vec![Box::new(crate::wallet::strategy::ListAccounts)],
        );

        connector.connect(&detail(&wallet)).await;

        assert_eq!(connector.strategy_names(), vec!["list_accounts"]);
        assert!(wallet.requests_for(RpcMethod::RequestAccounts).is_empty());
    }

    #[tokio::test]
    async fn test_rejected_switch_leaves_store() {
        let wallet = Arc::new(MemoryProvider::new(vec!["0x1".into()], 1));
        let connector = WalletConnector::new(WalletStore::new());
        connector.connect(&detail(&wallet)).await;

        wallet.fail(RpcMethod::SwitchEthereumChain, ProviderError::user_rejected());
        let err = connector.switch_chain(10u64).await.unwrap_err();

        assert!(err.is_user_rejection());
        assert_eq!(connector.wallet().unwrap().chain_id, ChainId(1));
    }

    #[test]
    fn test_disconnect_when_idle() {
        let connector = WalletConnector::new(WalletStore::new());
        connector.disconnect();
        assert!(!connector.is_connected());
    }
}
