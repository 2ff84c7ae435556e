//! Higher-level wrapper around a raw EIP-1193 provider.
//!
//! # Responsibilities
//! - Typed access to the account methods
//! - Signer lookup by account index, requesting access when none is exposed
//! - Address validation and checksumming

use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::Value;

use crate::provider::eip1193::Eip1193Provider;
use crate::provider::rpc::{decode, AccountsResponse, RpcMethod};
use crate::provider::types::{ProviderError, ProviderResult};

/// Typed client over an injected provider.
#[derive(Clone)]
pub struct BrowserProvider {
    inner: Arc<dyn Eip1193Provider>,
}

impl BrowserProvider {
    pub fn new(inner: Arc<dyn Eip1193Provider>) -> Self {
        Self { inner }
    }

    /// The wrapped provider.
    pub fn raw(&self) -> &Arc<dyn Eip1193Provider> {
        &self.inner
    }

    /// Send a request for `method`.
    pub async fn send(&self, method: RpcMethod, params: Option<Value>) -> ProviderResult<Value> {
        let mut args = method.request();
        args.params = params;
        self.inner.request(args).await
    }

    /// Accounts the wallet already exposes (`eth_accounts`).
    pub async fn list_accounts(&self) -> ProviderResult<Vec<String>> {
        let value = self.send(RpcMethod::Accounts, None).await?;
        let AccountsResponse(accounts) = decode(RpcMethod::Accounts, value)?;
        Ok(accounts)
    }

    /// Whether an account exists at `index` without prompting the user.
    pub async fn has_signer(&self, index: usize) -> ProviderResult<bool> {
        Ok(self.list_accounts().await?.len() > index)
    }

    /// Signer for the account at `index`.
    ///
    /// If the wallet does not expose that account yet, access is requested
    /// interactively before looking again.
    pub async fn get_signer(&self, index: usize) -> ProviderResult<JsonRpcSigner> {
        if !self.has_signer(index).await? {
            self.send(RpcMethod::RequestAccounts, None).await?;
        }

        let accounts = self.list_accounts().await?;
        let raw = accounts.get(index).ok_or(ProviderError::NoAccounts)?;
        let address: Address = raw
            .parse()
            .map_err(|_| ProviderError::InvalidAddress(raw.clone()))?;

        Ok(JsonRpcSigner {
            address,
            provider: self.clone(),
        })
    }
}

impl std::fmt::Debug for BrowserProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserProvider").finish_non_exhaustive()
    }
}

/// An account of a [`BrowserProvider`] able to sign through the wallet.
#[derive(Clone, Debug)]
pub struct JsonRpcSigner {
    address: Address,
    provider: BrowserProvider,
}

impl JsonRpcSigner {
    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address.
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn provider(&self) -> &BrowserProvider {
        &self.provider
    }
}
