//! Provider-facing types and error definitions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// EIP-1193 error code: the user rejected the request.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// EIP-1193 error code: the requested method is not supported.
pub const UNSUPPORTED_METHOD: i64 = 4200;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parse a chain id in the `0x`-prefixed hexadecimal form wallets emit.
    ///
    /// The prefix is optional, matching how wallets are parsed in the wild.
    pub fn from_hex(raw: &str) -> ProviderResult<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| ProviderError::InvalidChainId(raw.to_string()))
    }

    /// Encode as a `0x`-prefixed lowercase hexadecimal string.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced by wallet providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// The provider answered with an EIP-1193 / JSON-RPC error object.
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The provider does not implement the method.
    #[error("method not supported: {0}")]
    Unsupported(String),

    /// The request never reached the provider or the reply was lost.
    #[error("transport error: {0}")]
    Transport(String),

    /// The reply did not have the shape the method promises.
    #[error("malformed {method} response: {reason}")]
    MalformedResponse { method: String, reason: String },

    /// The provider exposed no accounts.
    #[error("no accounts available")]
    NoAccounts,

    /// An account string is not a valid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A chain id string is not valid hexadecimal.
    #[error("invalid chain id: {0}")]
    InvalidChainId(String),
}

impl ProviderError {
    /// The user declined the request in the wallet.
    pub fn user_rejected() -> Self {
        Self::Rpc {
            code: USER_REJECTED_REQUEST,
            message: "User rejected the request.".to_string(),
        }
    }

    /// Whether this is the EIP-1193 user-rejection error.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_REQUEST)
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Arguments of an EIP-1193 `request` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// Provider events the connection layer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    /// The EIP-1193 event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
        }
    }
}

impl fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event emitted by a provider, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// New account list, primary first.
    AccountsChanged(Vec<String>),
    /// New chain id as a hexadecimal string.
    ChainChanged(String),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            Self::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            Self::ChainChanged(_) => ProviderEventKind::ChainChanged,
        }
    }
}

/// Callback registered with a provider.
///
/// Identity matters: a listener is removed by passing the same `Arc` back.
pub type EventHandler = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

/// Whether two handlers are the same registration.
pub fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
    }

    #[test]
    fn test_chain_id_hex() {
        assert_eq!(ChainId::from_hex("0x2105").unwrap(), ChainId(8453));
        assert_eq!(ChainId::from_hex("0XA").unwrap(), ChainId(10));
        assert_eq!(ChainId::from_hex("a").unwrap(), ChainId(10));
        assert_eq!(ChainId(10).to_hex(), "0xa");
        assert_eq!(ChainId(0).to_hex(), "0x0");
        assert!(matches!(
            ChainId::from_hex("0xzz"),
            Err(ProviderError::InvalidChainId(_))
        ));
        assert!(ChainId::from_hex("").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::user_rejected();
        assert!(err.is_user_rejection());
        assert_eq!(err.to_string(), "provider error 4001: User rejected the request.");

        let err = ProviderError::MalformedResponse {
            method: "eth_chainId".into(),
            reason: "expected string".into(),
        };
        assert!(err.to_string().contains("eth_chainId"));
        assert!(!err.is_user_rejection());
    }

    #[test]
    fn test_handler_identity() {
        let a: EventHandler = Arc::new(|_: &ProviderEvent| {});
        let b: EventHandler = Arc::new(|_: &ProviderEvent| {});
        assert!(same_handler(&a, &a.clone()));
        assert!(!same_handler(&a, &b));
    }

    #[test]
    fn test_request_arguments_serialize() {
        let args = RequestArguments::new("eth_accounts");
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({ "method": "eth_accounts" }));
    }
}
