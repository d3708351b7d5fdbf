//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crosspay::config::CrossPayConfig;
use crosspay::lifecycle::Shutdown;
use crosspay::HttpServer;

pub const ACCOUNT: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";
pub const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

/// JSON-RPC wallet bridge answering from a method → reply table and
/// recording every call it receives.
#[derive(Clone, Default)]
pub struct MockWallet {
    replies: Arc<Mutex<HashMap<String, Result<Value, (i64, String)>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

#[allow(dead_code)]
impl MockWallet {
    /// Wallet with one account on Base that signs everything.
    pub fn approving() -> Self {
        let wallet = Self::default();
        wallet.reply("eth_requestAccounts", Ok(json!([ACCOUNT])));
        wallet.reply("eth_accounts", Ok(json!([ACCOUNT])));
        wallet.reply("eth_chainId", Ok(json!("0x2105")));
        wallet.reply("eth_sendTransaction", Ok(json!(TX_HASH)));
        wallet.reply("wallet_switchEthereumChain", Ok(Value::Null));
        wallet
    }

    pub fn reply(&self, method: &str, reply: Result<Value, (i64, String)>) {
        self.replies.lock().unwrap().insert(method.to_string(), reply);
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn answer(&self, request: &Value) -> Value {
        let method = request["method"].as_str().unwrap_or_default().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((method.clone(), request["params"].clone()));

        let reply = self.replies.lock().unwrap().get(&method).cloned();
        match reply {
            Some(Ok(result)) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Some(Err((code, message))) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
            None => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": 4200, "message": format!("unsupported method {}", method) },
            }),
        }
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(wallet_rpc))
            .route("/wallet", post(wallet_rpc))
            .with_state(self.clone())
    }
}

async fn wallet_rpc(State(wallet): State<MockWallet>, Json(request): Json<Value>) -> Json<Value> {
    Json(wallet.answer(&request))
}

/// Frame host bridge: `context`, `ready` and a `wallet` JSON-RPC endpoint.
#[derive(Clone)]
pub struct MockFrameHost {
    pub context: Option<Value>,
    pub wallet: MockWallet,
    pub ready_calls: Arc<Mutex<u32>>,
}

#[allow(dead_code)]
impl MockFrameHost {
    pub fn embedded(wallet: MockWallet) -> Self {
        Self {
            context: Some(json!({
                "user": { "fid": 3, "username": "dwr", "displayName": "Dan", "pfpUrl": null }
            })),
            wallet,
            ready_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn absent() -> Self {
        Self {
            context: None,
            wallet: MockWallet::default(),
            ready_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn ready_calls(&self) -> u32 {
        *self.ready_calls.lock().unwrap()
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/context", get(frame_context))
            .route("/ready", post(frame_ready))
            .with_state(self.clone())
            .merge(self.wallet.routes())
    }
}

async fn frame_context(State(host): State<MockFrameHost>) -> Response {
    match &host.context {
        Some(context) => Json(context.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn frame_ready(State(host): State<MockFrameHost>) -> StatusCode {
    *host.ready_calls.lock().unwrap() += 1;
    StatusCode::OK
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Serve `wallet` and return its bridge URL.
#[allow(dead_code)]
pub async fn start_wallet_bridge(wallet: &MockWallet) -> String {
    let addr = serve(wallet.routes()).await;
    format!("http://{}/", addr)
}

/// Serve `host` and return its base URL.
#[allow(dead_code)]
pub async fn start_frame_host(host: &MockFrameHost) -> String {
    let addr = serve(host.routes()).await;
    format!("http://{}/", addr)
}

/// Run the frame server without a chain client.
#[allow(dead_code)]
pub async fn start_server(config: CrossPayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::new(config), None);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .no_proxy()
        .build()
        .unwrap()
}
