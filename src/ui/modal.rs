//! Connect button and wallet selection modal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::discovery::ProviderDetail;
use crate::wallet::WalletConnector;

pub const CONNECT_LABEL: &str = "Connect Wallet";
pub const MODAL_TITLE: &str = "Connect Wallet";
pub const EMPTY_MESSAGE: &str = "No wallets found.";
pub const DISCONNECT_LABEL: &str = "Disconnect";

/// The "Connect Wallet" button; clicking it opens the modal.
#[derive(Debug)]
pub struct WalletConnect {
    modal: ConnectWalletModal,
}

impl WalletConnect {
    pub fn new(connector: Arc<WalletConnector>) -> Self {
        Self {
            modal: ConnectWalletModal::new(connector),
        }
    }

    pub fn label(&self) -> &'static str {
        CONNECT_LABEL
    }

    pub fn click(&self) {
        self.modal.open();
    }

    pub fn modal(&self) -> &ConnectWalletModal {
        &self.modal
    }
}

/// Wallet picker.
///
/// Lists discovered providers, connects to the chosen one and shows the
/// active connection with a way out.
#[derive(Debug)]
pub struct ConnectWalletModal {
    connector: Arc<WalletConnector>,
    open: AtomicBool,
    connecting: AtomicBool,
}

impl ConnectWalletModal {
    pub fn new(connector: Arc<WalletConnector>) -> Self {
        Self {
            connector,
            open: AtomicBool::new(false),
            connecting: AtomicBool::new(false),
        }
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    /// Connect to `detail`, then close.
    ///
    /// The modal closes and leaves the connecting state however the attempt
    /// ends, including when this future is dropped midway.
    pub async fn select(&self, detail: &ProviderDetail) {
        self.connecting.store(true, Ordering::SeqCst);
        let _reset = SelectionReset { modal: self };

        let wallet = self.connector.connect(detail).await;
        if wallet.accounts.is_empty() {
            tracing::warn!(wallet = %detail.info.name, "Wallet connected without accounts");
        }
    }

    /// Disconnect and close.
    pub fn disconnect(&self) {
        self.connector.disconnect();
        self.close();
    }

    /// Snapshot of everything the modal shows.
    pub fn view(&self) -> ModalView {
        let connecting = self.is_connecting();
        let connected = self.connector.wallet();
        let locked = connecting || connected.is_some();

        ModalView {
            open: self.is_open(),
            title: MODAL_TITLE,
            entries: self
                .connector
                .wallets()
                .iter()
                .map(|detail| WalletEntry {
                    key: detail.info.uuid.clone(),
                    name: detail.info.name.clone(),
                    icon: detail.info.icon.clone(),
                    disabled: locked,
                })
                .collect(),
            connecting,
            connected: connected.map(|wallet| ConnectedSummary {
                name: wallet.detail.info.name.clone(),
                account: wallet.primary_account().map(str::to_string),
                chain_id: wallet.chain_id.0,
            }),
        }
    }
}

struct SelectionReset<'a> {
    modal: &'a ConnectWalletModal,
}

impl Drop for SelectionReset<'_> {
    fn drop(&mut self) {
        self.modal.connecting.store(false, Ordering::SeqCst);
        self.modal.close();
    }
}

/// One selectable wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEntry {
    /// Announcement uuid.
    pub key: String,
    pub name: String,
    pub icon: String,
    pub disabled: bool,
}

/// The connected section of the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSummary {
    pub name: String,
    /// Primary account; absent for a connection without accounts.
    pub account: Option<String>,
    pub chain_id: u64,
}

/// Rendered state of [`ConnectWalletModal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub open: bool,
    pub title: &'static str,
    pub entries: Vec<WalletEntry>,
    pub connecting: bool,
    pub connected: Option<ConnectedSummary>,
}

impl ModalView {
    /// Message shown instead of the list when nothing was discovered.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.entries.is_empty().then_some(EMPTY_MESSAGE)
    }
}

impl fmt::Display for ModalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(message) = self.empty_message() {
            writeln!(f, "  {message}")?;
        }
        for entry in &self.entries {
            let state = if entry.disabled { " (disabled)" } else { "" };
            writeln!(f, "  [{}] {}{}", entry.key, entry.name, state)?;
        }
        if self.connecting {
            writeln!(f, "  Connecting...")?;
        }
        if let Some(connected) = &self.connected {
            writeln!(f, "  Connected: {}", connected.name)?;
            writeln!(f, "  Account: {}", connected.account.as_deref().unwrap_or(""))?;
            writeln!(f, "  Chain: {}", connected.chain_id)?;
            writeln!(f, "  [{DISCONNECT_LABEL}]")?;
        }
        Ok(())
    }
}
