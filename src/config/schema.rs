//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for CrossPay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for CrossPay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CrossPayConfig {
    /// HTTP server settings (frame surface, webhook, images).
    pub server: ServerConfig,

    /// Chain connectivity settings.
    pub chain: ChainConfig,

    /// Wallet connector settings.
    pub wallet: WalletConfig,

    /// Frame host integration and embed metadata.
    pub frame: FrameConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes (webhook payloads).
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
            max_body_size: 256 * 1024,
        }
    }
}

/// Chain connectivity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain ID payments are made on (8453 = Base mainnet).
    pub chain_id: u64,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Consecutive receipt lookup failures tolerated before a watch gives up.
    pub receipt_retry_limit: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 8453,
            rpc_url: "https://mainnet.base.org".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            poll_interval_ms: 2000,
            receipt_retry_limit: 10,
        }
    }
}

/// Wallet connector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the injected wallet's private key.
    pub private_key_env: String,

    /// EIP-1193 bridge of the hosted wallet SDK (Coinbase Wallet).
    pub coinbase_bridge_url: Option<String>,

    /// EIP-1193 relay for mobile wallets (WalletConnect).
    pub walletconnect_relay_url: Option<String>,

    /// WalletConnect project ID, sent to the relay.
    pub walletconnect_project_id: String,

    /// Timeout for wallet bridge requests in seconds.
    ///
    /// Generous by default: requests block while the user confirms a popup.
    pub bridge_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "CROSSPAY_PRIVATE_KEY".to_string(),
            coinbase_bridge_url: None,
            walletconnect_relay_url: None,
            walletconnect_project_id: "demo-project-id".to_string(),
            bridge_timeout_secs: 300,
        }
    }
}

/// Frame host and embed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Public URL the app is served from.
    pub app_url: String,

    /// App name shown by the host.
    pub name: String,

    /// Page description.
    pub description: String,

    /// Launch button title.
    pub button_title: String,

    /// Splash background colour (#RRGGBB).
    pub splash_background_color: String,

    /// Bridge to the frame host runtime, when running embedded.
    pub host_bridge_url: Option<String>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            app_url: "https://crosspay-base.vercel.app".to_string(),
            name: "CrossPay".to_string(),
            description: "Accept and send crypto payments instantly with QR codes. Built on Base blockchain with only 1% fees.".to_string(),
            button_title: "💳 Open CrossPay".to_string(),
            splash_background_color: "#3B82F6".to_string(),
            host_bridge_url: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
