//! Supported networks and block explorer links.

use alloy::primitives::TxHash;
use serde::Serialize;

/// Base mainnet.
pub const BASE: u64 = 8453;
/// Base Sepolia testnet.
pub const BASE_SEPOLIA: u64 = 84532;
/// Ethereum mainnet.
pub const ETHEREUM: u64 = 1;

/// A network the wallet can be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub id: u64,
    pub name: &'static str,
    pub icon: &'static str,
    pub native_symbol: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

/// Networks offered by the network switcher, default first.
pub const SUPPORTED_CHAINS: [Chain; 3] = [
    Chain {
        id: BASE,
        name: "Base",
        icon: "🔵",
        native_symbol: "ETH",
        rpc_url: "https://mainnet.base.org",
        explorer_url: "https://basescan.org",
    },
    Chain {
        id: BASE_SEPOLIA,
        name: "Base Sepolia",
        icon: "🧪",
        native_symbol: "ETH",
        rpc_url: "https://sepolia.base.org",
        explorer_url: "https://sepolia.basescan.org",
    },
    Chain {
        id: ETHEREUM,
        name: "Ethereum",
        icon: "💎",
        native_symbol: "ETH",
        rpc_url: "https://eth.llamarpc.com",
        explorer_url: "https://etherscan.io",
    },
];

/// Look up a supported chain.
pub fn find_chain(chain_id: u64) -> Option<&'static Chain> {
    SUPPORTED_CHAINS.iter().find(|c| c.id == chain_id)
}

/// The supported chain for `chain_id`, or the default (Base) when unknown.
pub fn chain_or_default(chain_id: u64) -> &'static Chain {
    find_chain(chain_id).unwrap_or(&SUPPORTED_CHAINS[0])
}

/// Base URL for transaction pages on `chain_id`'s explorer.
///
/// Unknown chains fall back to Etherscan.
pub fn explorer_tx_base(chain_id: u64) -> &'static str {
    match chain_id {
        BASE => "https://basescan.org/tx/",
        BASE_SEPOLIA => "https://sepolia.basescan.org/tx/",
        _ => "https://etherscan.io/tx/",
    }
}

/// Human block explorer link for a transaction.
pub fn explorer_tx_url(chain_id: u64, hash: &TxHash) -> String {
    format!("{}{}", explorer_tx_base(chain_id), hash)
}

/// Human block explorer link for an address.
pub fn explorer_address_url(chain_id: u64, address: &str) -> String {
    format!("{}/address/{}", chain_or_default(chain_id).explorer_url, address)
}
