//! Confirmation watcher.
//!
//! Polls a receipt source at a fixed interval until the transaction is mined.
//! There is no overall deadline; only a run of consecutive lookup failures
//! ends a watch early. A lookup that finds no receipt yet is not a failure.
//! Every lookup names the chain the transaction was sent on.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use async_trait::async_trait;
use tokio::time::sleep;

use crate::blockchain::chains;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::clients::ChainClients;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ReceiptOutcome};
use crate::observability::metrics;
use crate::payments::types::TxStatus;

/// Something that can look up receipts.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// `Ok(None)` while the transaction is not yet mined.
    async fn receipt_outcome(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptOutcome>>;
}

/// A single client only answers for its own chain.
#[async_trait]
impl ReceiptSource for BlockchainClient {
    async fn receipt_outcome(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptOutcome>> {
        if chain_id != self.chain_id() {
            return Err(BlockchainError::ChainMismatch {
                expected: chain_id,
                actual: self.chain_id(),
            });
        }
        self.get_receipt_outcome(hash).await
    }
}

#[async_trait]
impl ReceiptSource for ChainClients {
    async fn receipt_outcome(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> BlockchainResult<Option<ReceiptOutcome>> {
        self.client(chain_id).await?.get_receipt_outcome(hash).await
    }
}

#[derive(Clone)]
pub struct ConfirmationWatcher {
    source: Arc<dyn ReceiptSource>,
    chain_id: u64,
    poll_interval: Duration,
    retry_limit: u32,
}

impl ConfirmationWatcher {
    pub fn new(
        source: Arc<dyn ReceiptSource>,
        chain_id: u64,
        poll_interval: Duration,
        retry_limit: u32,
    ) -> Self {
        Self {
            source,
            chain_id,
            poll_interval,
            retry_limit,
        }
    }

    /// Same settings and source, different chain.
    pub fn for_chain(&self, chain_id: u64) -> Self {
        Self {
            chain_id,
            ..self.clone()
        }
    }

    /// Watch `hash` until it is mined, reporting every transition to
    /// `on_update`. Returns the terminal status.
    pub async fn watch<F>(&self, hash: TxHash, mut on_update: F) -> TxStatus
    where
        F: FnMut(TxStatus) + Send,
    {
        on_update(TxStatus::Confirming);
        let mut failures = 0u32;

        let status = loop {
            match self.source.receipt_outcome(self.chain_id, hash).await {
                Ok(Some(outcome)) => break self.terminal(hash, outcome),
                Ok(None) => failures = 0,
                Err(e) => {
                    failures += 1;
                    tracing::debug!(tx_hash = %hash, failures, error = %e, "Receipt lookup failed");
                    if failures > self.retry_limit {
                        metrics::record_confirmation("failed");
                        break TxStatus::Error {
                            message: e.to_string(),
                        };
                    }
                }
            }
            sleep(self.poll_interval).await;
        };

        match &status {
            TxStatus::Success { block_number, .. } => {
                tracing::info!(tx_hash = %hash, chain_id = self.chain_id, block_number, "Transaction confirmed")
            }
            TxStatus::Error { message } => {
                tracing::warn!(tx_hash = %hash, chain_id = self.chain_id, error = %message, "Transaction failed")
            }
            _ => {}
        }

        on_update(status.clone());
        status
    }

    fn terminal(&self, hash: TxHash, outcome: ReceiptOutcome) -> TxStatus {
        if outcome.success {
            metrics::record_confirmation("success");
            TxStatus::Success {
                block_number: outcome.block_number,
                explorer_url: chains::explorer_tx_url(self.chain_id, &hash),
            }
        } else {
            metrics::record_confirmation("reverted");
            TxStatus::Error {
                message: "Transaction reverted".to_string(),
            }
        }
    }
}
