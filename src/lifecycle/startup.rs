//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect the chain client
//! - Detect the frame host
//! - Build the connectors that are configured
//! - Assemble the wallet session and payment flow
//!
//! # Design Decisions
//! - An unreachable RPC or frame host is not fatal
//! - A connector whose prerequisites are missing is left out, never stubbed

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::blockchain::{BlockchainClient, BlockchainError, ChainClients};
use crate::config::CrossPayConfig;
use crate::frame::{FrameError, FrameSession, HttpFrameHost};
use crate::payments::{ConfirmationWatcher, PaymentFlow, PaymentSubmitter, ReceiptSource};
use crate::wallet::{
    ConnectorKind, HttpEip1193Provider, LocalSignerConnector, ProviderRpcError, RelayConnector,
    WalletConnector, WalletSession,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Wallet bridge for {kind}: {source}")]
    Bridge {
        kind: ConnectorKind,
        source: ProviderRpcError,
    },
}

/// Everything a surface (server or CLI) needs.
pub struct CrossPayApp {
    pub config: Arc<CrossPayConfig>,
    pub client: Arc<BlockchainClient>,
    /// Clients for every supported chain, `client` included.
    pub clients: Arc<ChainClients>,
    pub frame: FrameSession,
    pub session: Arc<WalletSession>,
    pub flow: Arc<PaymentFlow>,
}

/// Bring up all subsystems in dependency order.
pub async fn bootstrap(config: CrossPayConfig) -> Result<CrossPayApp, StartupError> {
    let config = Arc::new(config);
    let client = Arc::new(BlockchainClient::new(config.chain.clone()).await?);
    let clients = Arc::new(ChainClients::new(client.clone()));
    let frame = detect_frame(&config).await?;

    let connectors = build_connectors(&config, &frame)?;
    tracing::info!(
        connectors = ?connectors.iter().map(|c| c.kind().id()).collect::<Vec<_>>(),
        in_frame = frame.is_in_frame(),
        "Wallet connectors ready"
    );
    let session = Arc::new(WalletSession::new(connectors, frame.is_in_frame()));

    let watcher = ConfirmationWatcher::new(
        clients.clone() as Arc<dyn ReceiptSource>,
        config.chain.chain_id,
        Duration::from_millis(config.chain.poll_interval_ms),
        config.chain.receipt_retry_limit,
    );
    let submitter = PaymentSubmitter::new(session.clone(), frame.clone());
    let flow = Arc::new(PaymentFlow::new(
        submitter,
        watcher,
        session.clone(),
        config.chain.chain_id,
    ));

    Ok(CrossPayApp {
        config,
        client,
        clients,
        frame,
        session,
        flow,
    })
}

async fn detect_frame(config: &CrossPayConfig) -> Result<FrameSession, StartupError> {
    match &config.frame.host_bridge_url {
        Some(url) => {
            let host = HttpFrameHost::new(
                url,
                Duration::from_secs(config.server.request_timeout_secs),
                Duration::from_secs(config.wallet.bridge_timeout_secs),
            )?;
            Ok(FrameSession::detect(&host).await)
        }
        None => Ok(FrameSession::standalone()),
    }
}

/// Connectors available under `config`, in display order.
pub fn build_connectors(
    config: &CrossPayConfig,
    frame: &FrameSession,
) -> Result<Vec<Arc<dyn WalletConnector>>, StartupError> {
    let mut connectors: Vec<Arc<dyn WalletConnector>> = Vec::new();
    let bridge_timeout = Duration::from_secs(config.wallet.bridge_timeout_secs);

    if let Some(provider) = frame.wallet_provider() {
        connectors.push(Arc::new(RelayConnector::new(
            ConnectorKind::FarcasterFrame,
            provider,
        )));
    }

    match LocalSignerConnector::from_env(&config.wallet.private_key_env, &config.chain.rpc_url) {
        Ok(local) => connectors.push(Arc::new(local)),
        Err(e) => tracing::debug!(error = %e, "Injected wallet unavailable"),
    }

    if let Some(url) = &config.wallet.coinbase_bridge_url {
        let provider = HttpEip1193Provider::new(url, bridge_timeout).map_err(|source| {
            StartupError::Bridge {
                kind: ConnectorKind::CoinbaseWalletSdk,
                source,
            }
        })?;
        connectors.push(Arc::new(RelayConnector::new(
            ConnectorKind::CoinbaseWalletSdk,
            Arc::new(provider),
        )));
    }

    if let Some(url) = &config.wallet.walletconnect_relay_url {
        let url = relay_url_with_project(url, &config.wallet.walletconnect_project_id);
        let provider = HttpEip1193Provider::new(&url, bridge_timeout).map_err(|source| {
            StartupError::Bridge {
                kind: ConnectorKind::WalletConnect,
                source,
            }
        })?;
        connectors.push(Arc::new(RelayConnector::new(
            ConnectorKind::WalletConnect,
            Arc::new(provider),
        )));
    }

    Ok(connectors)
}

fn relay_url_with_project(url: &str, project_id: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("projectId", project_id);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
