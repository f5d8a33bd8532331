//! Integration tests for the alloy-backed chain client against a mock node.
//!
//! The node is a small axum server answering the handful of `eth_*`
//! methods the gateway uses; requests are recorded for inspection.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, U256, hex};
use alloy_sol_types::{Revert, SolCall, SolError, SolValue};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use ticketchain_gateway::chain::contracts::event_factory::getEventDetailsCall;
use ticketchain_gateway::chain::contracts::ticket_nft::tokenURICall;
use ticketchain_gateway::chain::{
    AlloyRpc, ChainContext, ChainError, ChainRpc, EventSchema, LogFilter, ReceiptPolling, RpcError,
};
use ticketchain_gateway::config::{ChainConfig, PurchaseMode};
use ticketchain_gateway::domain::{EventId, TicketId};

type Requests = Arc<Mutex<Vec<Value>>>;

fn signer() -> Address {
    Address::repeat_byte(0x5e)
}

fn selector_hex(selector: [u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

async fn node(State(requests): State<Requests>, Json(req): Json<Value>) -> impl IntoResponse {
    if let Ok(mut log) = requests.lock() {
        log.push(req.clone());
    }
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let method = req.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = req.get("params").cloned().unwrap_or(Value::Null);

    let result = match method {
        "eth_chainId" => json!("0x89"),
        "eth_accounts" => json!([signer()]),
        "eth_blockNumber" => json!("0x10"),
        "eth_getLogs" => json!([]),
        "eth_call" => {
            let call = &params[0];
            let data = call["input"]
                .as_str()
                .or_else(|| call["data"].as_str())
                .unwrap_or_default();
            if data.starts_with(&selector_hex(getEventDetailsCall::SELECTOR)) {
                let encoded = (
                    "Rust Meetup".to_string(),
                    U256::from(1_900_000_000u64),
                    U256::from(1_000u64),
                    U256::from(50u64),
                    U256::from(20u64),
                    "bafymeta".to_string(),
                    "bafyimage".to_string(),
                    Address::repeat_byte(0x0a),
                )
                    .abi_encode_params();
                json!(format!("0x{}", hex::encode(encoded)))
            } else if data.starts_with(&selector_hex(tokenURICall::SELECTOR)) {
                let revert = Revert {
                    reason: "ERC721: invalid token ID".to_string(),
                };
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": 3,
                        "message": "execution reverted: ERC721: invalid token ID",
                        "data": format!("0x{}", hex::encode(revert.abi_encode())),
                    },
                }));
            } else {
                json!("0x")
            }
        }
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "method not found" },
            }));
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

async fn spawn(router: Router) -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

async fn mock_node() -> (SocketAddr, Requests) {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/", post(node))
        .with_state(Arc::clone(&requests));
    (spawn(router).await, requests)
}

fn config(rpc_url: String, chain_id: u64) -> ChainConfig {
    ChainConfig {
        key: "polygon".to_string(),
        name: "Polygon".to_string(),
        chain_id,
        rpc_url,
        event_factory: Address::repeat_byte(0xfa),
        ticket_nft: Address::repeat_byte(0x7c),
        from_block: 0,
        log_block_span: None,
        event_schemas: EventSchema::ALL.to_vec(),
        purchase_mode: PurchaseMode::Atomic,
        native_symbol: "POL".to_string(),
    }
}

fn context(addr: SocketAddr, chain_id: u64) -> ChainContext {
    let url = format!("http://{addr}");
    let Ok(rpc) = AlloyRpc::connect(url.clone(), Duration::from_secs(5)) else {
        panic!("client should build");
    };
    let polling = ReceiptPolling {
        interval: Duration::from_millis(1),
        attempts: 2,
    };
    ChainContext::new(config(url, chain_id), Arc::new(rpc), polling)
}

#[tokio::test]
async fn chain_id_and_signer_come_from_the_node() {
    let (addr, _) = mock_node().await;
    let chain = context(addr, 137);

    assert!(chain.verify_chain_id().await.is_ok());
    let signer_result = chain.client.signer_address().await;
    assert_eq!(signer_result.ok(), Some(signer()));

    let mismatched = context(addr, 1);
    assert!(matches!(
        mismatched.verify_chain_id().await,
        Err(RpcError::ChainIdMismatch {
            expected: 1,
            reported: 137
        })
    ));
}

#[tokio::test]
async fn garbled_chain_id_is_not_a_mismatch() {
    let router = Router::new().route(
        "/",
        post(|Json(req): Json<Value>| async move {
            Json(json!({ "jsonrpc": "2.0", "id": req["id"], "result": "not-a-number" }))
        }),
    );
    let addr = spawn(router).await;
    let url = format!("http://{addr}");
    let Ok(rpc) = AlloyRpc::connect(url.clone(), Duration::from_secs(5)) else {
        panic!("client should build");
    };
    let chain = ChainContext::new(config(url, 137), Arc::new(rpc), ReceiptPolling::default());

    let result = chain.verify_chain_id().await;
    assert!(matches!(result, Err(RpcError::Decode(_))));
}

#[tokio::test]
async fn event_details_decode_from_call_output() {
    let (addr, _) = mock_node().await;
    let chain = context(addr, 137);

    let Ok(details) = chain.factory.event_details(EventId::new(1)).await else {
        panic!("details should decode");
    };
    assert_eq!(details.name, "Rust Meetup");
    assert_eq!(details.remaining, U256::from(20u64));
    assert_eq!(details.ipfsCID, "bafymeta");
    assert_eq!(details.organizer, Address::repeat_byte(0x0a));
}

#[tokio::test]
async fn revert_reason_is_decoded_from_error_data() {
    let (addr, _) = mock_node().await;
    let chain = context(addr, 137);

    let result = chain.tickets.token_uri(TicketId::new(99)).await;
    let Err(ChainError::Reverted { reason, transaction }) = result else {
        panic!("expected a revert");
    };
    assert_eq!(reason, "ERC721: invalid token ID");
    assert_eq!(transaction, None);
}

#[tokio::test]
async fn log_filter_ors_schema_signatures() {
    let (addr, requests) = mock_node().await;
    let chain = context(addr, 137);

    let filter = LogFilter::new(chain.config.event_factory)
        .event_signatures(EventSchema::ALL.iter().map(|s| s.signature_hash()));
    let logs = chain.client.rpc().get_logs(&filter).await;
    assert_eq!(logs.ok().map(|l| l.len()), Some(0));

    let Ok(recorded) = requests.lock() else {
        panic!("request log poisoned");
    };
    let Some(request) = recorded.iter().find(|r| r["method"] == "eth_getLogs") else {
        panic!("eth_getLogs not sent");
    };
    let topic0 = &request["params"][0]["topics"][0];
    assert_eq!(topic0.as_array().map(Vec::len), Some(2));
    assert_eq!(request["params"][0]["fromBlock"], "0x0");
    assert_eq!(request["params"][0]["toBlock"], "latest");
}

#[tokio::test]
async fn chunked_queries_split_the_block_range() {
    let (addr, requests) = mock_node().await;
    let chain = context(addr, 137);

    let filter = LogFilter::new(chain.config.ticket_nft);
    let logs = chain.client.get_logs(&filter, Some(8)).await;
    assert!(logs.is_ok());

    let Ok(recorded) = requests.lock() else {
        panic!("request log poisoned");
    };
    let windows: Vec<(String, String)> = recorded
        .iter()
        .filter(|r| r["method"] == "eth_getLogs")
        .map(|r| {
            (
                r["params"][0]["fromBlock"].as_str().unwrap_or_default().to_string(),
                r["params"][0]["toBlock"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    assert_eq!(
        windows,
        vec![
            ("0x0".to_string(), "0x7".to_string()),
            ("0x8".to_string(), "0xf".to_string()),
            ("0x10".to_string(), "0x10".to_string()),
        ]
    );
}

#[tokio::test]
async fn http_errors_are_transport_failures() {
    let router = Router::new().route(
        "/",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream down") }),
    );
    let addr = spawn(router).await;
    let Ok(rpc) = AlloyRpc::connect(format!("http://{addr}"), Duration::from_secs(5)) else {
        panic!("client should build");
    };

    assert!(matches!(rpc.chain_id().await, Err(RpcError::Transport(_))));
}

#[tokio::test]
async fn unknown_method_surfaces_the_error_object() {
    let (addr, _) = mock_node().await;
    let Ok(rpc) = AlloyRpc::connect(format!("http://{addr}"), Duration::from_secs(5)) else {
        panic!("client should build");
    };

    let hash = alloy_primitives::B256::repeat_byte(1);
    let Err(RpcError::Response { code, .. }) = rpc.transaction_receipt(hash).await else {
        panic!("expected an error object");
    };
    assert_eq!(code, -32601);
}
