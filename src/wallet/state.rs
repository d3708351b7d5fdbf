//! Wallet connection state.

use alloy::primitives::Address;
use serde::Serialize;

/// Account exposed by a connected wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    pub address: Address,
    pub chain_id: u64,
}

/// Wallet connection state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected { address: Address, chain_id: u64 },
}

impl ConnectionState {
    /// Check if wallet is connected
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Connected account, if any.
    pub fn account(&self) -> Option<Account> {
        match self {
            ConnectionState::Connected { address, chain_id } => Some(Account {
                address: *address,
                chain_id: *chain_id,
            }),
            _ => None,
        }
    }

    /// Get chain ID if connected
    pub fn chain_id(&self) -> Option<u64> {
        self.account().map(|a| a.chain_id)
    }

    /// Format for display (0x1234...5678)
    pub fn display_name(&self) -> String {
        match self {
            ConnectionState::Connected { address, .. } => short_address(address),
            ConnectionState::Connecting => "connecting...".to_string(),
            ConnectionState::Disconnected => "not connected".to_string(),
        }
    }
}

impl From<Account> for ConnectionState {
    fn from(account: Account) -> Self {
        ConnectionState::Connected {
            address: account.address,
            chain_id: account.chain_id,
        }
    }
}

/// Shorten an address to its first 6 and last 4 characters.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
