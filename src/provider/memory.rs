//! In-memory wallet provider.
//!
//! Answers the connection methods from local state and emits events when
//! that state changes. Individual methods can be scripted to fail or to
//! return canned replies, which is how the connection workflow is exercised
//! against misbehaving wallets.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::eip1193::Eip1193Provider;
use crate::provider::emitter::EventEmitter;
use crate::provider::rpc::{RpcMethod, SwitchChainParameter};
use crate::provider::types::{
    ChainId, EventHandler, ProviderError, ProviderEvent, ProviderEventKind, ProviderResult,
    RequestArguments, UNSUPPORTED_METHOD,
};

#[derive(Debug, Default)]
struct WalletState {
    accounts: Vec<String>,
    chain_id: u64,
    overrides: HashMap<String, ProviderResult<Value>>,
    requests: Vec<RequestArguments>,
}

/// A wallet that lives in process memory.
#[derive(Debug)]
pub struct MemoryProvider {
    state: Mutex<WalletState>,
    emitter: EventEmitter,
    listener_removal: bool,
}

impl MemoryProvider {
    pub fn new(accounts: Vec<String>, chain_id: u64) -> Self {
        Self {
            state: Mutex::new(WalletState {
                accounts,
                chain_id,
                ..Default::default()
            }),
            emitter: EventEmitter::new(),
            listener_removal: true,
        }
    }

    /// Behave like a wallet that lacks `removeListener`.
    pub fn without_listener_removal(mut self) -> Self {
        self.listener_removal = false;
        self
    }

    /// Make every call to `method` fail with `error`.
    pub fn fail(&self, method: RpcMethod, error: ProviderError) {
        self.lock()
            .overrides
            .insert(method.as_str().to_string(), Err(error));
    }

    /// Make every call to `method` return `value` without touching state.
    pub fn respond(&self, method: RpcMethod, value: Value) {
        self.lock()
            .overrides
            .insert(method.as_str().to_string(), Ok(value));
    }

    /// Drop the scripted behaviour of `method`.
    pub fn restore(&self, method: RpcMethod) {
        self.lock().overrides.remove(method.as_str());
    }

    /// Switch accounts the way a user would in the wallet UI.
    pub fn set_accounts(&self, accounts: Vec<String>) {
        self.lock().accounts = accounts.clone();
        self.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// Switch chains from the wallet side.
    pub fn set_chain(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
        self.emit(ProviderEvent::ChainChanged(ChainId(chain_id).to_hex()));
    }

    /// Emit an arbitrary event to the registered listeners.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        self.emitter.emit(&event)
    }

    pub fn accounts(&self) -> Vec<String> {
        self.lock().accounts.clone()
    }

    pub fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RequestArguments> {
        self.lock().requests.clone()
    }

    /// Requests received for `method`.
    pub fn requests_for(&self, method: RpcMethod) -> Vec<RequestArguments> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method.as_str())
            .cloned()
            .collect()
    }

    pub fn listener_count(&self, event: ProviderEventKind) -> usize {
        self.emitter.listener_count(event)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn switch_chain(&self, params: Option<&Value>) -> ProviderResult<Value> {
        let target: SwitchChainParameter = params
            .and_then(|p| p.get(0))
            .cloned()
            .ok_or_else(|| ProviderError::Rpc {
                code: -32602,
                message: "missing chain parameter".to_string(),
            })
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| ProviderError::Rpc {
                    code: -32602,
                    message: e.to_string(),
                })
            })?;
        let chain_id = ChainId::from_hex(&target.chain_id)?;

        let changed = {
            let mut state = self.lock();
            let changed = state.chain_id != chain_id.0;
            state.chain_id = chain_id.0;
            changed
        };
        if changed {
            self.emit(ProviderEvent::ChainChanged(chain_id.to_hex()));
        }
        Ok(Value::Null)
    }
}

#[async_trait]
impl Eip1193Provider for MemoryProvider {
    async fn request(&self, args: RequestArguments) -> ProviderResult<Value> {
        let scripted = {
            let mut state = self.lock();
            state.requests.push(args.clone());
            state.overrides.get(&args.method).cloned()
        };
        if let Some(reply) = scripted {
            return reply;
        }

        match RpcMethod::from_name(&args.method) {
            Some(RpcMethod::RequestAccounts) | Some(RpcMethod::Accounts) => {
                Ok(json!(self.accounts()))
            }
            Some(RpcMethod::ChainId) => Ok(json!(ChainId(self.chain_id()).to_hex())),
            Some(RpcMethod::SwitchEthereumChain) => self.switch_chain(args.params.as_ref()),
            None => Err(ProviderError::Rpc {
                code: UNSUPPORTED_METHOD,
                message: format!("{} is not supported", args.method),
            }),
        }
    }

    fn on(&self, event: ProviderEventKind, handler: EventHandler) {
        self.emitter.on(event, handler);
    }

    fn remove_listener(&self, event: ProviderEventKind, handler: &EventHandler) -> bool {
        if !self.listener_removal {
            return false;
        }
        self.emitter.remove(event, handler)
    }

    fn supports_listener_removal(&self) -> bool {
        self.listener_removal
    }
}
