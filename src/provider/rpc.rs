//! Typed views of the wallet RPC methods the connection layer consumes.
//!
//! Wallets disagree on response shapes. Each method gets its own response
//! type, decoded once at the boundary, so the workflow never sniffs raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::provider::types::{ChainId, ProviderError, ProviderResult, RequestArguments};

/// Wallet RPC methods used by the connection workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// Interactive account access (may prompt the user).
    RequestAccounts,
    /// Non-interactive list of already-authorized accounts.
    Accounts,
    ChainId,
    SwitchEthereumChain,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestAccounts => "eth_requestAccounts",
            Self::Accounts => "eth_accounts",
            Self::ChainId => "eth_chainId",
            Self::SwitchEthereumChain => "wallet_switchEthereumChain",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eth_requestAccounts" => Some(Self::RequestAccounts),
            "eth_accounts" => Some(Self::Accounts),
            "eth_chainId" => Some(Self::ChainId),
            "wallet_switchEthereumChain" => Some(Self::SwitchEthereumChain),
            _ => None,
        }
    }

    /// Request arguments without parameters.
    pub fn request(self) -> RequestArguments {
        RequestArguments::new(self.as_str())
    }
}

/// `eth_requestAccounts` reply: a bare list, or an object carrying `accounts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestAccountsResponse {
    List(Vec<String>),
    Wrapped { accounts: Vec<String> },
}

impl RequestAccountsResponse {
    pub fn into_accounts(self) -> Vec<String> {
        match self {
            Self::List(accounts) | Self::Wrapped { accounts } => accounts,
        }
    }
}

/// `eth_accounts` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AccountsResponse(pub Vec<String>);

/// `eth_chainId` reply: the standard hex string, or a bare number some wallets return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChainIdResponse {
    Hex(String),
    Numeric(u64),
}

impl ChainIdResponse {
    pub fn chain_id(&self) -> ProviderResult<ChainId> {
        match self {
            Self::Hex(raw) => ChainId::from_hex(raw),
            Self::Numeric(id) => Ok(ChainId(*id)),
        }
    }
}

/// Single parameter object of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchChainParameter {
    #[serde(rename = "chainId")]
    pub chain_id: String,
}

impl SwitchChainParameter {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id: chain_id.to_hex(),
        }
    }
}

/// Build a `wallet_switchEthereumChain` request for `chain_id`.
pub fn switch_chain_request(chain_id: ChainId) -> RequestArguments {
    RpcMethod::SwitchEthereumChain
        .request()
        .with_params(json!([SwitchChainParameter::new(chain_id)]))
}

/// Decode a raw reply into the response type of `method`.
pub fn decode<T: serde::de::DeserializeOwned>(method: RpcMethod, value: Value) -> ProviderResult<T> {
    serde_json::from_value(value).map_err(|e| ProviderError::MalformedResponse {
        method: method.as_str().to_string(),
        reason: e.to_string(),
    })
}
