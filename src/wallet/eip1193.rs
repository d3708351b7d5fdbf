//! EIP-1193 style wallet providers.
//!
//! A wallet bridge exposes a single `request(method, params)` entry point.
//! The frame host's wallet, the hosted wallet SDK and the mobile relay are
//! all reached this way; [`HttpEip1193Provider`] speaks it as JSON-RPC over
//! HTTP.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// EIP-1193 code for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// Code used when the bridge could not be reached at all.
pub const TRANSPORT_ERROR_CODE: i64 = -32000;

/// Error returned by a provider request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The bridge could not be reached.
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::new(TRANSPORT_ERROR_CODE, format!("network request failed: {}", message))
    }

    /// The bridge answered with something unexpected.
    pub fn invalid_response(message: impl fmt::Display) -> Self {
        Self::new(-32603, format!("invalid provider response: {}", message))
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }
}

impl fmt::Display for ProviderRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderRpcError {}

/// Minimal EIP-1193 provider surface.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Issue a raw request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;
}

/// `eth_requestAccounts`: first authorized account.
pub async fn request_account(provider: &dyn Eip1193Provider) -> Result<Address, ProviderRpcError> {
    let accounts = provider.request("eth_requestAccounts", json!([])).await?;
    let first = accounts
        .as_array()
        .and_then(|a| a.first())
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderRpcError::invalid_response("no accounts returned"))?;
    Address::from_str(first).map_err(ProviderRpcError::invalid_response)
}

/// `eth_chainId` decoded from its hex quantity.
pub async fn chain_id(provider: &dyn Eip1193Provider) -> Result<u64, ProviderRpcError> {
    let value = provider.request("eth_chainId", json!([])).await?;
    let hex = value
        .as_str()
        .ok_or_else(|| ProviderRpcError::invalid_response("chain id is not a string"))?;
    parse_quantity(hex).ok_or_else(|| ProviderRpcError::invalid_response(format!("bad chain id '{}'", hex)))
}

/// `eth_sendTransaction` with a JSON transaction object.
pub async fn send_transaction(
    provider: &dyn Eip1193Provider,
    transaction: Value,
) -> Result<TxHash, ProviderRpcError> {
    let value = provider
        .request("eth_sendTransaction", json!([transaction]))
        .await?;
    let hash = value
        .as_str()
        .ok_or_else(|| ProviderRpcError::invalid_response("transaction hash is not a string"))?;
    TxHash::from_str(hash).map_err(ProviderRpcError::invalid_response)
}

/// `wallet_switchEthereumChain`.
pub async fn switch_chain(provider: &dyn Eip1193Provider, chain_id: u64) -> Result<(), ProviderRpcError> {
    provider
        .request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format!("0x{:x}", chain_id) }]),
        )
        .await
        .map(|_| ())
}

fn parse_quantity(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderRpcError>,
}

/// EIP-1193 provider reached as JSON-RPC 2.0 over HTTP.
#[derive(Debug)]
pub struct HttpEip1193Provider {
    url: url::Url,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpEip1193Provider {
    /// Create a provider for the bridge at `url`.
    ///
    /// `timeout` bounds each request, including the time the user spends
    /// confirming in their wallet.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderRpcError> {
        let url = url::Url::parse(url).map_err(|e| {
            ProviderRpcError::invalid_response(format!("invalid bridge URL '{}': {}", url, e))
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderRpcError::transport)?;
        Ok(Self {
            url,
            http,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl Eip1193Provider for HttpEip1193Provider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(bridge = %self.url, method, id, "Wallet bridge request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(ProviderRpcError::transport)?;

        let status = response.status();
        let parsed: JsonRpcResponse = response.json().await.map_err(|e| {
            if status.is_success() {
                ProviderRpcError::invalid_response(e)
            } else {
                ProviderRpcError::transport(format!("bridge returned HTTP {}", status))
            }
        })?;

        match (parsed.result, parsed.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}
