//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the registry, the store and the event sync from a validated config
//! - Announce the configured wallets
//! - Re-announce on config reload and keep one poller per node-backed wallet
//!
//! # Design Decisions
//! - Subsystems initialize in order: store, sync, then announcements, so the
//!   store sees the very first snapshot
//! - A reload retires the pollers of replaced providers, except the one
//!   feeding the connected wallet
//! - Logging and metrics are installed by the binary, not here

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::discovery::{ConfiguredWallets, ProviderRegistry};
use crate::lifecycle::Shutdown;
use crate::provider::{Eip1193Provider, HttpProvider};
use crate::state::WalletStore;
use crate::ui::{PageShell, WalletConnect};
use crate::wallet::{EventSync, WalletConnector};

/// A running event poller and the provider it feeds.
struct Poller {
    provider: Arc<HttpProvider>,
    task: JoinHandle<()>,
}

impl Poller {
    fn polls(&self, provider: &Arc<HttpProvider>) -> bool {
        Arc::ptr_eq(&self.provider, provider)
    }
}

/// Everything a running session needs, wired together.
pub struct App {
    pub registry: ProviderRegistry,
    pub store: WalletStore,
    pub connector: Arc<WalletConnector>,
    pub shell: PageShell,
    pub shutdown: Shutdown,
    poll_interval: Duration,
    wallets: ConfiguredWallets,
    pollers: Vec<Poller>,
    sync: EventSync,
}

impl App {
    /// Wire up a session from `config` and announce its wallets.
    pub fn bootstrap(config: &AppConfig) -> Self {
        let registry = ProviderRegistry::new();
        let store = WalletStore::new();
        let sync = EventSync::mount(store.clone(), &registry);
        let connector = Arc::new(WalletConnector::new(store.clone()));

        let wallets = ConfiguredWallets::from_config(&config.wallets);
        registry.request_providers(&wallets);
        tracing::info!(wallets = registry.len(), "Wallets announced");

        Self {
            registry,
            store,
            connector,
            shell: PageShell::new(&config.app),
            shutdown: Shutdown::new(),
            poll_interval: Duration::from_millis(config.connection.poll_interval_ms),
            wallets,
            pollers: Vec::new(),
            sync,
        }
    }

    /// A connect button bound to this session.
    pub fn connect_button(&self) -> WalletConnect {
        WalletConnect::new(self.connector.clone())
    }

    /// Start event polling for node-backed wallets that have no poller yet.
    ///
    /// Returns how many pollers were started. Nothing starts after shutdown.
    pub fn spawn_pollers(&mut self) -> usize {
        if self.shutdown.is_triggered() {
            return 0;
        }
        let mut started = 0;
        for provider in self.wallets.pollable() {
            if self.pollers.iter().any(|poller| poller.polls(provider)) {
                continue;
            }
            let task = provider.spawn_poller(self.poll_interval, self.shutdown.subscribe());
            self.pollers.push(Poller {
                provider: Arc::clone(provider),
                task,
            });
            started += 1;
        }
        started
    }

    /// Pollers whose task has not exited.
    pub fn live_pollers(&self) -> usize {
        self.pollers.iter().filter(|poller| !poller.task.is_finished()).count()
    }

    /// Apply a reloaded configuration.
    ///
    /// Wallets are re-announced: known uuids are replaced in place, new ones
    /// appended. Pollers of providers that are no longer announced stop,
    /// unless the connected wallet still uses them. Returns how many pollers
    /// were started for the new providers.
    pub fn reload(&mut self, config: &AppConfig) -> usize {
        self.shell = PageShell::new(&config.app);
        self.poll_interval = Duration::from_millis(config.connection.poll_interval_ms);
        self.wallets = ConfiguredWallets::from_config(&config.wallets);
        self.registry.request_providers(&self.wallets);

        let retired = self.retire_pollers();
        let started = self.spawn_pollers();
        tracing::info!(
            wallets = self.registry.len(),
            pollers_retired = retired,
            pollers_started = started,
            "Configuration reloaded"
        );
        started
    }

    pub fn is_listening(&self) -> bool {
        self.sync.is_listening()
    }

    /// Disconnect, stop background tasks and release the event sync.
    pub fn shutdown(self) {
        self.connector.disconnect();
        self.shutdown.trigger();
        tracing::info!("Session closed");
    }

    fn retire_pollers(&mut self) -> usize {
        let connected = self.store.connected.load();
        let wallets = &self.wallets;
        let (keep, retire): (Vec<Poller>, Vec<Poller>) =
            std::mem::take(&mut self.pollers).into_iter().partition(|poller| {
                let provider: Arc<dyn Eip1193Provider> = poller.provider.clone();
                wallets.pollable().iter().any(|p| poller.polls(p))
                    || (*connected)
                        .as_ref()
                        .is_some_and(|wallet| wallet.uses_provider(&provider))
            });

        for poller in &retire {
            tracing::debug!(url = %poller.provider.url(), "Stopping poller of replaced provider");
            poller.task.abort();
        }
        self.pollers = keep;
        retire.len()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .field("poll_interval", &self.poll_interval)
            .field("pollers", &self.pollers.len())
            .finish_non_exhaustive()
    }
}
