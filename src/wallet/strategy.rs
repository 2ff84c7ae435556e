//! Account discovery strategies.
//!
//! Wallets implement the account methods unevenly. Connecting walks an
//! ordered list of strategies and keeps the first non-empty answer; a
//! strategy that fails or finds nothing just hands over to the next one.

use async_trait::async_trait;

use crate::provider::rpc::{decode, AccountsResponse, RequestAccountsResponse, RpcMethod};
use crate::provider::{BrowserProvider, Eip1193Provider, ProviderResult};

/// One way of asking a wallet for its accounts.
#[async_trait]
pub trait AccountStrategy: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Try to obtain accounts. An empty list means "nothing found here".
    async fn discover(
        &self,
        provider: &dyn Eip1193Provider,
        browser: &BrowserProvider,
    ) -> ProviderResult<Vec<String>>;
}

/// Interactive `eth_requestAccounts`.
///
/// Accepts a bare list or an object with an `accounts` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestAccounts;

#[async_trait]
impl AccountStrategy for RequestAccounts {
    fn name(&self) -> &'static str {
        "request_accounts"
    }

    async fn discover(
        &self,
        provider: &dyn Eip1193Provider,
        _browser: &BrowserProvider,
    ) -> ProviderResult<Vec<String>> {
        let value = provider.request(RpcMethod::RequestAccounts.request()).await?;
        let response: RequestAccountsResponse = decode(RpcMethod::RequestAccounts, value)?;
        Ok(response.into_accounts())
    }
}

/// Address of the wrapper's primary signer, checksummed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignerAddress;

#[async_trait]
impl AccountStrategy for SignerAddress {
    fn name(&self) -> &'static str {
        "signer_address"
    }

    async fn discover(
        &self,
        _provider: &dyn Eip1193Provider,
        browser: &BrowserProvider,
    ) -> ProviderResult<Vec<String>> {
        let signer = browser.get_signer(0).await?;
        Ok(vec![signer.checksum_address()])
    }
}

/// Non-interactive `eth_accounts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAccounts;

#[async_trait]
impl AccountStrategy for ListAccounts {
    fn name(&self) -> &'static str {
        "list_accounts"
    }

    async fn discover(
        &self,
        provider: &dyn Eip1193Provider,
        _browser: &BrowserProvider,
    ) -> ProviderResult<Vec<String>> {
        let value = provider.request(RpcMethod::Accounts.request()).await?;
        let AccountsResponse(accounts) = decode(RpcMethod::Accounts, value)?;
        Ok(accounts)
    }
}

/// The standard order: interactive request, signer, plain listing.
pub fn default_strategies() -> Vec<Box<dyn AccountStrategy>> {
    vec![
        Box::new(RequestAccounts),
        Box::new(SignerAddress),
        Box::new(ListAccounts),
    ]
}
