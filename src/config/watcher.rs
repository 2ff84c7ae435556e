//! Hot reload of the wallet configuration.
//!
//! Editors often write a file in several steps, so one save can produce a
//! burst of change events. Only revisions that parse, validate and differ
//! from the last forwarded one reach the receiver; each forwarded revision
//! re-announces the wallets and restarts node pollers.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Last revision handed to the application.
#[derive(Debug)]
struct Revisions {
    current: AppConfig,
}

impl Revisions {
    /// `Some` when `next` changes anything.
    fn accept(&mut self, next: AppConfig) -> Option<AppConfig> {
        if next == self.current {
            return None;
        }
        self.current = next.clone();
        Some(next)
    }
}

/// Watches the configuration file and forwards changed wallet setups.
pub struct ConfigWatcher {
    path: PathBuf,
    revisions: Revisions,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// `current` is the configuration the session was started with.
    pub fn new(path: &Path, current: &AppConfig) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            revisions: Revisions {
                current: current.clone(),
            },
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Keep the returned watcher alive for as long as
    /// updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            revisions,
            update_tx,
        } = self;
        let revisions = Mutex::new(revisions);
        let source = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let config = match load_config(&source) {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::error!(error = %e, "Wallet config rejected, keeping the announced wallets");
                            return;
                        }
                    };
                    let wallets = config.wallets.len();
                    let accepted = revisions
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .accept(config);
                    match accepted {
                        Some(config) => {
                            tracing::info!(wallets, "Wallet config changed, re-announcing");
                            let _ = update_tx.send(config);
                        }
                        None => tracing::debug!(wallets, "Wallet config unchanged"),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Wallet config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Watching wallet config");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const ONE_WALLET: &str = r#"
        [[wallets]]
        name = "Dev"
        rdns = "dev.mysafe.memory"
        [wallets.transport]
        kind = "memory"
    "#;

    #[test]
    fn test_identical_revision_is_dropped() {
        let start = parse_config(ONE_WALLET).unwrap();
        let mut revisions = Revisions {
            current: start.clone(),
        };

        assert!(revisions.accept(start).is_none());

        let renamed = parse_config(&ONE_WALLET.replace("\"Dev\"", "\"Dev 2\"")).unwrap();
        let forwarded = revisions.accept(renamed.clone()).unwrap();
        assert_eq!(forwarded.wallets[0].name, "Dev 2");
        assert!(revisions.accept(renamed).is_none());
    }

    #[test]
    fn test_missing_file_fails_to_watch() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, _rx) = ConfigWatcher::new(&dir.path().join("absent.toml"), &AppConfig::default());
        assert!(watcher.run().is_err());
    }
}
