//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ChainConfig (chain id, RPC URL, failover URLs)
//!     → client.rs (read-only RPC with timeouts and failover)
//!     → clients.rs (one client per chain, built on first use)
//!     → erc20.rs (token reads, transfer/approve calldata)
//! chains.rs: supported networks and explorer links
//! ```
//!
//! # Security Constraints
//! - No signing happens here; wallets sign
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod chains;
pub mod client;
pub mod clients;
pub mod erc20;
pub mod types;

pub use chains::{Chain, SUPPORTED_CHAINS};
pub use client::BlockchainClient;
pub use clients::ChainClients;
pub use erc20::{Erc20Token, TokenBalance};
pub use types::{BlockchainError, BlockchainResult, ChainId, ReceiptOutcome};
