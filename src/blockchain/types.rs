//! Chain-specific types and error definitions.

use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// No client can be built for this chain.
    #[error("Unsupported chain {0}")]
    UnsupportedChain(u64),

    /// Contract call failed or returned undecodable data.
    #[error("Contract call failed: {0}")]
    Contract(String),

    /// Amount could not be converted to or from integer units.
    #[error("Unit conversion failed: {0}")]
    Units(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// What a mined receipt says about a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptOutcome {
    /// Block the transaction was included in, when reported.
    pub block_number: Option<u64>,
    /// Whether execution succeeded.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(8453u64);
        assert_eq!(chain_id.0, 8453);
        assert_eq!(u64::from(chain_id), 8453);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::UnsupportedChain(137);
        assert_eq!(err.to_string(), "Unsupported chain 137");

        let err = BlockchainError::ChainMismatch {
            expected: 8453,
            actual: 1,
        };
        assert!(err.to_string().contains("8453"));
    }
}
