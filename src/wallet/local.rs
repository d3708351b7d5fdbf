//! Injected wallet backed by a local private key.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::wallet::connector::{ConnectorKind, WalletConnector, WalletError};
use crate::wallet::state::Account;

/// Wallet that signs locally and submits through the chain library.
pub struct LocalSignerConnector {
    address: Address,
    provider: DynProvider,
}

impl std::fmt::Debug for LocalSignerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSignerConnector")
            .field("address", &self.address)
            .finish()
    }
}

impl LocalSignerConnector {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `rpc_url` - Endpoint transactions are submitted to
    pub fn from_private_key(private_key_hex: &str, rpc_url: &str) -> Result<Self, WalletError> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::Signer(format!("Invalid private key format: {}", e)))?;
        let address = signer.address();

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| WalletError::Signer(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        tracing::info!(address = %address, "Local signer loaded");

        Ok(Self { address, provider })
    }

    /// Load the key from the environment variable `var`.
    pub fn from_env(var: &str, rpc_url: &str) -> Result<Self, WalletError> {
        let private_key = std::env::var(var)
            .map_err(|_| WalletError::Signer(format!("Environment variable {} not set", var)))?;

        Self::from_private_key(&private_key, rpc_url)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletConnector for LocalSignerConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Injected
    }

    async fn connect(&self) -> Result<Account, WalletError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        tracing::info!(connector = "injected", address = %self.address, chain_id, "Wallet connected");
        Ok(Account {
            address: self.address,
            chain_id,
        })
    }

    async fn disconnect(&self) {
        tracing::info!(connector = "injected", "Wallet disconnected");
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let pending = self
            .provider
            .send_transaction(tx.with_from(self.address))
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        // A local signer is bound to its RPC endpoint's chain.
        let current = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        if current == chain_id {
            Ok(())
        } else {
            Err(WalletError::Transport(format!(
                "RPC endpoint serves chain {}, cannot switch to {}",
                current, chain_id
            )))
        }
    }
}
