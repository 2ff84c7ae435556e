//! Node-backed wallets over JSON-RPC.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use mysafe::config::parse_config;
use mysafe::provider::{
    Eip1193Provider, HttpProvider, ProviderError, ProviderEvent, RpcMethod,
};
use mysafe::{App, ChainId};

mod common;
use common::{detail, start_mock_node, Harness};

#[derive(Debug)]
struct Node {
    accounts: Vec<String>,
    chain_id: u64,
}

fn shared_node(accounts: &[&str], chain_id: u64) -> Arc<Mutex<Node>> {
    Arc::new(Mutex::new(Node {
        accounts: accounts.iter().map(|a| a.to_string()).collect(),
        chain_id,
    }))
}

async fn serve(node: Arc<Mutex<Node>>) -> url::Url {
    let addr = start_mock_node(move |method, params| {
        let mut node = node.lock().unwrap();
        match method {
            "eth_accounts" | "eth_requestAccounts" => Ok(json!(node.accounts)),
            "eth_chainId" => Ok(json!(format!("{:#x}", node.chain_id))),
            "wallet_switchEthereumChain" => {
                let raw = params[0]["chainId"].as_str().unwrap_or_default();
                node.chain_id = u64::from_str_radix(raw.trim_start_matches("0x"), 16)
                    .map_err(|e| (-32602, e.to_string()))?;
                Ok(Value::Null)
            }
            _ => Err((-32601, "Method not found".to_string())),
        }
    })
    .await;
    format!("http://{addr}").parse().unwrap()
}

#[tokio::test]
async fn test_requests_are_forwarded() {
    let url = serve(shared_node(&["0xabc"], 8453)).await;
    let provider = HttpProvider::new(url);

    let chain = provider.request(RpcMethod::ChainId.request()).await.unwrap();
    assert_eq!(chain, json!("0x2105"));

    let err = provider
        .request(mysafe::provider::RequestArguments::new("eth_sign"))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::Unsupported("eth_sign".into()));
}

#[tokio::test]
async fn test_connect_over_http() {
    let node = shared_node(&["0xabc"], 8453);
    let url = serve(node.clone()).await;
    let h = Harness::new();

    let connected = h
        .connector
        .connect(&detail("node", "Node", Arc::new(HttpProvider::new(url))))
        .await;
    assert_eq!(connected.accounts, vec!["0xabc".to_string()]);
    assert_eq!(connected.chain_id, ChainId(8453));

    h.connector.switch_chain(10u64).await.unwrap();
    assert_eq!(node.lock().unwrap().chain_id, 10);
    assert_eq!(h.store.connected.get().unwrap().chain_id, ChainId(10));
}

#[tokio::test]
async fn test_polling_emits_changes_into_the_store() {
    let node = shared_node(&["0xaaa"], 1);
    let url = serve(node.clone()).await;
    let provider = Arc::new(HttpProvider::new(url));
    let h = Harness::new();
    h.connector
        .connect(&detail("node", "Node", provider.clone()))
        .await;

    assert!(provider.poll_once().await.is_empty(), "first poll is a baseline");

    {
        let mut node = node.lock().unwrap();
        node.accounts = vec!["0xbbb".into()];
        node.chain_id = 137;
    }
    let events = provider.poll_once().await;

    assert_eq!(
        events,
        vec![
            ProviderEvent::AccountsChanged(vec!["0xbbb".into()]),
            ProviderEvent::ChainChanged("0x89".into()),
        ]
    );
    let wallet = h.store.connected.get().unwrap();
    assert_eq!(wallet.accounts, vec!["0xbbb".to_string()]);
    assert_eq!(wallet.chain_id, ChainId(137));
}

#[tokio::test]
async fn test_session_pollers_stop_on_shutdown() {
    let url = serve(shared_node(&["0xaaa"], 1)).await;
    let config = parse_config(&format!(
        r#"
        [connection]
        poll_interval_ms = 20

        [[wallets]]
        name = "Node"
        rdns = "test.node"
        [wallets.transport]
        kind = "http"
        rpc_url = "{url}"
        "#
    ))
    .unwrap();
    let mut app = App::bootstrap(&config);

    assert_eq!(app.spawn_pollers(), 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.live_pollers(), 1);

    let shutdown = app.shutdown.clone();
    app.shutdown();
    tokio::time::timeout(Duration::from_secs(2), async {
        while shutdown.receiver_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("pollers stopped");
}
