//! Node-backed provider speaking JSON-RPC over HTTP.
//!
//! # Responsibilities
//! - Forward EIP-1193 requests as JSON-RPC 2.0 calls
//! - Map JSON-RPC error objects onto provider errors
//! - Emulate `accountsChanged` / `chainChanged` by polling
//!
//! Plain HTTP has no push channel, so events only exist while a poller
//! task is running (see [`HttpProvider::spawn_poller`]).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::provider::eip1193::Eip1193Provider;
use crate::provider::emitter::EventEmitter;
use crate::provider::rpc::{decode, AccountsResponse, ChainIdResponse, RpcMethod};
use crate::provider::types::{
    EventHandler, ProviderError, ProviderEvent, ProviderEventKind, ProviderResult,
    RequestArguments, UNSUPPORTED_METHOD,
};

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// Last values observed by the poller.
#[derive(Debug, Default)]
struct Observed {
    accounts: Option<Vec<String>>,
    chain: Option<String>,
}

/// Provider backed by a JSON-RPC endpoint.
pub struct HttpProvider {
    client: reqwest::Client,
    url: url::Url,
    next_id: AtomicU64,
    emitter: EventEmitter,
    observed: Mutex<Observed>,
}

impl HttpProvider {
    pub fn new(url: url::Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            next_id: AtomicU64::new(1),
            emitter: EventEmitter::new(),
            observed: Mutex::new(Observed::default()),
        }
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Poll the node every `interval` and emit events on change.
    ///
    /// The first poll only records a baseline. The task exits when the
    /// shutdown signal fires.
    pub fn spawn_poller(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!(
                url = %provider.url,
                interval_ms = interval.as_millis() as u64,
                "Provider event poller starting"
            );
            let mut ticker = time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        provider.poll_once().await;
                    }
                    _ = shutdown.recv() => {
                        tracing::info!(url = %provider.url, "Provider event poller stopping");
                        break;
                    }
                }
            }
        })
    }

    /// One polling round. Returns the events that were emitted.
    pub async fn poll_once(&self) -> Vec<ProviderEvent> {
        let mut events = Vec::new();

        match self.fetch(RpcMethod::Accounts).await.and_then(|v| decode::<AccountsResponse>(RpcMethod::Accounts, v)) {
            Ok(AccountsResponse(accounts)) => {
                if let Some(event) = self.observe_accounts(accounts) {
                    events.push(event);
                }
            }
            Err(e) => tracing::warn!(url = %self.url, error = %e, "Polling eth_accounts failed"),
        }

        match self.fetch(RpcMethod::ChainId).await.and_then(|v| decode::<ChainIdResponse>(RpcMethod::ChainId, v)) {
            Ok(response) => match response.chain_id() {
                Ok(chain_id) => {
                    if let Some(event) = self.observe_chain(chain_id.to_hex()) {
                        events.push(event);
                    }
                }
                Err(e) => tracing::warn!(url = %self.url, error = %e, "Node returned an invalid chain id"),
            },
            Err(e) => tracing::warn!(url = %self.url, error = %e, "Polling eth_chainId failed"),
        }

        for event in &events {
            self.emitter.emit(event);
        }
        events
    }

    fn observe_accounts(&self, accounts: Vec<String>) -> Option<ProviderEvent> {
        let mut observed = self.observed.lock().unwrap_or_else(|e| e.into_inner());
        let previous = observed.accounts.replace(accounts.clone());
        match previous {
            Some(prev) if prev != accounts => Some(ProviderEvent::AccountsChanged(accounts)),
            _ => None,
        }
    }

    fn observe_chain(&self, chain: String) -> Option<ProviderEvent> {
        let mut observed = self.observed.lock().unwrap_or_else(|e| e.into_inner());
        let previous = observed.chain.replace(chain.clone());
        match previous {
            Some(prev) if prev != chain => Some(ProviderEvent::ChainChanged(chain)),
            _ => None,
        }
    }

    async fn fetch(&self, method: RpcMethod) -> ProviderResult<Value> {
        self.call(method.as_str(), None).await
    }

    async fn call(&self, method: &str, params: Option<Value>) -> ProviderResult<Value> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: params.unwrap_or_else(|| Value::Array(Vec::new())),
        };

        let res = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "{} returned status {}",
                self.url, status
            )));
        }

        let reply: JsonRpcResponse = res
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        interpret(method, reply)
    }
}

fn interpret(method: &str, reply: JsonRpcResponse) -> ProviderResult<Value> {
    match (reply.result, reply.error) {
        (_, Some(err)) if err.code == METHOD_NOT_FOUND || err.code == UNSUPPORTED_METHOD => {
            Err(ProviderError::Unsupported(method.to_string()))
        }
        (_, Some(err)) => Err(ProviderError::Rpc {
            code: err.code,
            message: err.message,
        }),
        (Some(result), None) => Ok(result),
        (None, None) => Ok(Value::Null),
    }
}

#[async_trait]
impl Eip1193Provider for HttpProvider {
    async fn request(&self, args: RequestArguments) -> ProviderResult<Value> {
        tracing::debug!(url = %self.url, method = %args.method, "JSON-RPC request");
        self.call(&args.method, args.params).await
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler) {
        self.emitter.on(event, handler);
    }

    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler) -> bool {
        self.emitter.remove(event, handler)
    }
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("url", &self.url.as_str())
            .field("emitter", &self.emitter)
            .finish()
    }
}
