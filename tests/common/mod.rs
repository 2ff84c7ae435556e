//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use mysafe::provider::{Eip1193Provider, MemoryProvider};
use mysafe::{EventSync, ProviderDetail, ProviderInfo, ProviderRegistry, WalletConnector, WalletStore};

/// A checksummable address (first anvil dev account, lowercase).
pub const DEV_ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
/// `DEV_ACCOUNT` with EIP-55 casing.
pub const DEV_ACCOUNT_CHECKSUM: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Registry, store, event sync and connector wired together.
pub struct Harness {
    pub registry: ProviderRegistry,
    pub store: WalletStore,
    pub connector: WalletConnector,
    pub sync: EventSync,
}

impl Harness {
    pub fn new() -> Self {
        let registry = ProviderRegistry::new();
        let store = WalletStore::new();
        let sync = EventSync::mount(store.clone(), &registry);
        let connector = WalletConnector::new(store.clone());
        Self {
            registry,
            store,
            connector,
            sync,
        }
    }
}

/// In-memory wallet holding `accounts` on `chain_id`.
pub fn memory_wallet(accounts: &[&str], chain_id: u64) -> Arc<MemoryProvider> {
    Arc::new(MemoryProvider::new(
        accounts.iter().map(|a| a.to_string()).collect(),
        chain_id,
    ))
}

/// Announcement for `provider`.
pub fn detail(uuid: &str, name: &str, provider: Arc<dyn Eip1193Provider>) -> ProviderDetail {
    ProviderDetail::new(
        ProviderInfo {
            uuid: uuid.into(),
            name: name.into(),
            icon: "data:image/svg+xml,<svg/>".into(),
            rdns: format!("test.{}", name.to_lowercase()),
        },
        provider,
    )
}

/// Start a JSON-RPC node on an ephemeral port.
///
/// `handler` gets the method and params of each call and answers with a
/// result or a `(code, message)` error.
pub async fn start_mock_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_body(&mut socket).await else {
                            return;
                        };
                        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        let method = request["method"].as_str().unwrap_or_default().to_string();

                        let reply = match handler(&method, &request["params"]) {
                            Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
                            Err((code, message)) => json!({
                                "jsonrpc": "2.0",
                                "id": request["id"],
                                "error": { "code": code, "message": message }
                            }),
                        };
                        let payload = reply.to_string();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            payload.len(),
                            payload
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(buf[header_end..header_end + length].to_vec())
}
