//! Payment tracking types.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

/// Where a tracked transaction is in its life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TxStatus {
    /// Hash known, nothing polled yet.
    Pending,
    /// Polling for a receipt.
    Confirming,
    /// Mined and executed successfully.
    Success {
        block_number: Option<u64>,
        explorer_url: String,
    },
    /// Reverted on-chain, or the watch gave up.
    Error { message: String },
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Success { .. } | TxStatus::Error { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirming => "confirming",
            TxStatus::Success { .. } => "success",
            TxStatus::Error { .. } => "error",
        }
    }
}

/// The single transaction the app is currently tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub chain_id: u64,
    #[serde(flatten)]
    pub status: TxStatus,
}

impl TransactionRecord {
    pub fn pending(hash: TxHash, chain_id: u64) -> Self {
        Self {
            hash,
            chain_id,
            status: TxStatus::Pending,
        }
    }
}

/// How a payment reached the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPath {
    /// Raw request to the frame host's wallet.
    Host,
    /// The active connector's send operation.
    Generic,
}

impl SubmissionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPath::Host => "host",
            SubmissionPath::Generic => "generic",
        }
    }
}

/// Result of handing a payment to a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub hash: TxHash,
    pub path: SubmissionPath,
    pub to: Address,
    pub value: U256,
}
