//! Wallet connectors.
//!
//! # Responsibilities
//! - Name the connection methods the app offers
//! - Connect/disconnect a wallet and report its account
//! - Hand transactions to the wallet for signing and broadcast
//!
//! # Design Decisions
//! - One trait for every connection method so the session does not care
//!   whether a wallet is local, relayed or provided by the frame host
//! - Relay connectors never sign; the remote wallet does

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wallet::eip1193::{self, Eip1193Provider, ProviderRpcError};
use crate::wallet::state::Account;

/// Connection methods, by their connector id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorKind {
    /// The frame host's built-in wallet.
    #[serde(rename = "farcasterFrame")]
    FarcasterFrame,
    /// A browser-injected style wallet (local signer).
    #[serde(rename = "injected")]
    Injected,
    /// Hosted wallet SDK (Coinbase Wallet / Smart Wallet).
    #[serde(rename = "coinbaseWalletSDK")]
    CoinbaseWalletSdk,
    /// Mobile wallet relay.
    #[serde(rename = "walletConnect")]
    WalletConnect,
}

impl ConnectorKind {
    pub const ALL: [ConnectorKind; 4] = [
        ConnectorKind::FarcasterFrame,
        ConnectorKind::Injected,
        ConnectorKind::CoinbaseWalletSdk,
        ConnectorKind::WalletConnect,
    ];

    /// Stable connector id.
    pub fn id(&self) -> &'static str {
        match self {
            ConnectorKind::FarcasterFrame => "farcasterFrame",
            ConnectorKind::Injected => "injected",
            ConnectorKind::CoinbaseWalletSdk => "coinbaseWalletSDK",
            ConnectorKind::WalletConnect => "walletConnect",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectorKind::FarcasterFrame => "Farcaster Wallet",
            ConnectorKind::Injected => "Injected Wallet",
            ConnectorKind::CoinbaseWalletSdk => "Coinbase Wallet",
            ConnectorKind::WalletConnect => "WalletConnect",
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConnectorKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectorKind::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| WalletError::UnknownConnector(s.to_string()))
    }
}

/// Errors raised by connectors.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The wallet or its bridge rejected or failed the request.
    #[error("{0}")]
    Provider(#[from] ProviderRpcError),

    /// The chain library failed to submit the transaction.
    #[error("{0}")]
    Transport(String),

    /// Signer could not be created.
    #[error("Wallet error: {0}")]
    Signer(String),

    /// No connector with this id.
    #[error("Unknown connector '{0}'")]
    UnknownConnector(String),
}

/// A way of connecting a wallet.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn kind(&self) -> ConnectorKind;

    /// Ask the wallet for its account and current chain.
    async fn connect(&self) -> Result<Account, WalletError>;

    /// Forget the connection. Never fails.
    async fn disconnect(&self);

    /// Sign and broadcast `tx`, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;

    /// Ask the wallet to move to another chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;
}

/// Connector backed by an EIP-1193 bridge.
pub struct RelayConnector {
    kind: ConnectorKind,
    provider: Arc<dyn Eip1193Provider>,
}

impl RelayConnector {
    pub fn new(kind: ConnectorKind, provider: Arc<dyn Eip1193Provider>) -> Self {
        Self { kind, provider }
    }
}

#[async_trait]
impl WalletConnector for RelayConnector {
    fn kind(&self) -> ConnectorKind {
        self.kind
    }

    async fn connect(&self) -> Result<Account, WalletError> {
        let address = eip1193::request_account(self.provider.as_ref()).await?;
        let chain_id = eip1193::chain_id(self.provider.as_ref()).await?;
        tracing::info!(connector = %self.kind, address = %address, chain_id, "Wallet connected");
        Ok(Account { address, chain_id })
    }

    async fn disconnect(&self) {
        tracing::info!(connector = %self.kind, "Wallet disconnected");
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let transaction = serde_json::to_value(&tx)
            .map_err(|e| WalletError::Transport(format!("unencodable transaction: {}", e)))?;
        Ok(eip1193::send_transaction(self.provider.as_ref(), transaction).await?)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        Ok(eip1193::switch_chain(self.provider.as_ref(), chain_id).await?)
    }
}
