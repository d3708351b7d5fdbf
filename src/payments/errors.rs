//! Payment error classification.
//!
//! Wallets and RPC nodes report failures as free-form text. Messages are
//! bucketed by case-insensitive substring match, first match wins:
//!
//! | needle                           | bucket            |
//! |----------------------------------|-------------------|
//! | `user rejected`, `user denied`   | user rejected     |
//! | `insufficient`                   | insufficient funds|
//! | `network`                        | network           |
//! | `gas`                            | gas estimation    |
//! | `execution reverted`             | contract revert   |
//! | anything else                    | unknown           |

use thiserror::Error;

use crate::payments::draft::DraftError;
use crate::wallet::eip1193::ProviderRpcError;
use crate::wallet::{SessionError, WalletError};

const REVERT_PREFIX: &str = "execution reverted: ";
const DEFAULT_REVERT_REASON: &str = "Transaction reverted";

/// A classified wallet or chain failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Transaction was rejected by user")]
    UserRejected,

    #[error("Insufficient funds for transaction")]
    InsufficientFunds,

    #[error("Network error. Please check your connection.")]
    Network,

    #[error("Gas estimation failed. Transaction may fail.")]
    GasEstimation,

    #[error("{reason}")]
    ContractRevert { reason: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl PaymentError {
    /// Bucket a raw error message.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("user rejected") || lower.contains("user denied") {
            PaymentError::UserRejected
        } else if lower.contains("insufficient") {
            PaymentError::InsufficientFunds
        } else if lower.contains("network") {
            PaymentError::Network
        } else if lower.contains("gas") {
            PaymentError::GasEstimation
        } else if lower.contains("execution reverted") {
            PaymentError::ContractRevert {
                reason: revert_reason(message),
            }
        } else {
            PaymentError::Unknown {
                message: message.to_string(),
            }
        }
    }

    /// Classify a wallet provider error, honouring its EIP-1193 code.
    pub fn from_rpc(error: &ProviderRpcError) -> Self {
        if error.is_user_rejection() {
            PaymentError::UserRejected
        } else {
            Self::classify(&error.message)
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::UserRejected => "USER_REJECTED",
            PaymentError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            PaymentError::Network => "NETWORK_ERROR",
            PaymentError::GasEstimation => "GAS_ESTIMATION_ERROR",
            PaymentError::ContractRevert { .. } => "EXECUTION_REVERTED",
            PaymentError::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    /// Whether retrying the same payment could succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PaymentError::UserRejected | PaymentError::InsufficientFunds
        )
    }
}

impl From<&WalletError> for PaymentError {
    fn from(error: &WalletError) -> Self {
        match error {
            WalletError::Provider(rpc) => PaymentError::from_rpc(rpc),
            other => PaymentError::classify(&other.to_string()),
        }
    }
}

fn revert_reason(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    lower
        .find(REVERT_PREFIX)
        .map(|idx| message[idx + REVERT_PREFIX.len()..].trim())
        .filter(|reason| !reason.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_REVERT_REASON.to_string())
}

/// Why a submit attempt did not produce a transaction hash.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("A payment is already being submitted")]
    Busy,

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl SubmitError {
    /// Code for metrics and display.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Draft(_) => "INVALID_DRAFT",
            SubmitError::NotConnected => "NOT_CONNECTED",
            SubmitError::Busy => "BUSY",
            SubmitError::Payment(e) => e.code(),
        }
    }
}

impl From<SessionError> for SubmitError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotConnected => SubmitError::NotConnected,
            SessionError::Wallet(ref wallet) => SubmitError::Payment(PaymentError::from(wallet)),
            other => SubmitError::Payment(PaymentError::classify(&other.to_string())),
        }
    }
}
