//! Announcements for configured wallets.
//!
//! Builds one provider per `[[wallets]]` entry and replays them to the
//! registry whenever discovery is requested.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::schema::{WalletConfig, WalletTransport};
use crate::discovery::registry::AnnouncementSource;
use crate::discovery::types::{ProviderDetail, ProviderInfo};
use crate::provider::{HttpProvider, MemoryProvider};

/// Icon used when a wallet entry does not configure one.
pub const DEFAULT_ICON: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'%3E%3Crect width='24' height='24' rx='6'/%3E%3C/svg%3E";

/// The announcement uuid of a configured wallet.
///
/// Explicit uuids win. Otherwise a UUIDv5 of the rdns (or the name) keeps
/// the id stable across reloads, so a re-announcement replaces the entry.
pub fn wallet_uuid(wallet: &WalletConfig) -> String {
    if let Some(uuid) = &wallet.uuid {
        return uuid.clone();
    }
    let key = if wallet.rdns.is_empty() {
        &wallet.name
    } else {
        &wallet.rdns
    };
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, key.as_bytes()).to_string()
}

/// Providers built from the configuration.
#[derive(Debug, Default)]
pub struct ConfiguredWallets {
    details: Vec<ProviderDetail>,
    pollable: Vec<Arc<HttpProvider>>,
}

impl ConfiguredWallets {
    pub fn from_config(wallets: &[WalletConfig]) -> Self {
        let mut configured = Self::default();

        for wallet in wallets {
            let info = ProviderInfo {
                uuid: wallet_uuid(wallet),
                name: wallet.name.clone(),
                icon: if wallet.icon.is_empty() {
                    DEFAULT_ICON.to_string()
                } else {
                    wallet.icon.clone()
                },
                rdns: wallet.rdns.clone(),
            };

            match &wallet.transport {
                WalletTransport::Memory { accounts, chain_id } => {
                    let provider = Arc::new(MemoryProvider::new(accounts.clone(), *chain_id));
                    configured.details.push(ProviderDetail::new(info, provider));
                }
                WalletTransport::Http { rpc_url } => match rpc_url.parse::<url::Url>() {
                    Ok(url) => {
                        let provider = Arc::new(HttpProvider::new(url));
                        configured.pollable.push(provider.clone());
                        configured.details.push(ProviderDetail::new(info, provider));
                    }
                    Err(e) => {
                        tracing::warn!(wallet = %wallet.name, url = %rpc_url, error = %e, "Ignoring wallet with invalid RPC URL");
                    }
                },
            }
        }

        configured
    }

    pub fn details(&self) -> &[ProviderDetail] {
        &self.details
    }

    /// Node-backed providers, which need a poller to produce events.
    pub fn pollable(&self) -> &[Arc<HttpProvider>] {
        &self.pollable
    }
}

impl AnnouncementSource for ConfiguredWallets {
    fn announce_all(&self, sink: &mut dyn FnMut(ProviderDetail)) {
        for detail in &self.details {
            sink(detail.clone());
        }
    }
}
