//! ERC-20 token helpers.
//!
//! Reads go straight through `eth_call`; writes only build calldata, the
//! caller sends it through whichever wallet connector is active.

use alloy::network::TransactionBuilder;
use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Standard ERC-20 interface.
    #[derive(Debug)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Balance of a token together with what is needed to display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
    pub symbol: String,
}

impl TokenBalance {
    /// Balance as a decimal string in whole-token units.
    pub fn formatted(&self) -> BlockchainResult<String> {
        format_amount(self.raw, self.decimals)
    }
}

/// Read helpers for one ERC-20 contract.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    address: Address,
    client: BlockchainClient,
}

impl Erc20Token {
    pub fn new(address: Address, client: BlockchainClient) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> BlockchainResult<C::Return> {
        let output = self
            .client
            .call(self.address, Bytes::from(call.abi_encode()))
            .await?;
        C::abi_decode_returns(&output)
            .map_err(|e| BlockchainError::Contract(format!("{}: {}", C::SIGNATURE, e)))
    }

    pub async fn name(&self) -> BlockchainResult<String> {
        self.read(IERC20::nameCall {}).await
    }

    pub async fn symbol(&self) -> BlockchainResult<String> {
        self.read(IERC20::symbolCall {}).await
    }

    pub async fn decimals(&self) -> BlockchainResult<u8> {
        self.read(IERC20::decimalsCall {}).await
    }

    pub async fn balance_of(&self, owner: Address) -> BlockchainResult<U256> {
        self.read(IERC20::balanceOfCall { owner }).await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> BlockchainResult<U256> {
        self.read(IERC20::allowanceCall { owner, spender }).await
    }

    /// Balance, decimals and symbol in one go.
    pub async fn balance(&self, owner: Address) -> BlockchainResult<TokenBalance> {
        let raw = self.balance_of(owner).await?;
        let decimals = self.decimals().await?;
        let symbol = self.symbol().await?;
        Ok(TokenBalance {
            raw,
            decimals,
            symbol,
        })
    }

    /// Unsigned `transfer` transaction for a decimal `amount`.
    ///
    /// Looks up decimals on-chain unless given.
    pub async fn transfer_request(
        &self,
        to: Address,
        amount: &str,
        decimals: Option<u8>,
    ) -> BlockchainResult<TransactionRequest> {
        let decimals = match decimals {
            Some(d) => d,
            None => self.decimals().await?,
        };
        let amount = parse_amount(amount, decimals)?;
        Ok(self.request(IERC20::transferCall { to, amount }))
    }

    /// Unsigned `approve` transaction for a decimal `amount`.
    pub async fn approve_request(
        &self,
        spender: Address,
        amount: &str,
        decimals: Option<u8>,
    ) -> BlockchainResult<TransactionRequest> {
        let decimals = match decimals {
            Some(d) => d,
            None => self.decimals().await?,
        };
        let amount = parse_amount(amount, decimals)?;
        Ok(self.request(IERC20::approveCall { spender, amount }))
    }

    fn request<C: SolCall>(&self, call: C) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(call.abi_encode()))
    }
}

/// Convert a decimal string to integer units with `decimals` places.
pub fn parse_amount(amount: &str, decimals: u8) -> BlockchainResult<U256> {
    parse_units(amount.trim(), decimals)
        .map(Into::into)
        .map_err(|e| BlockchainError::Units(format!("'{}': {}", amount, e)))
}

/// Format integer units as a decimal string with `decimals` places.
pub fn format_amount(raw: U256, decimals: u8) -> BlockchainResult<String> {
    format_units(raw, decimals).map_err(|e| BlockchainError::Units(e.to_string()))
}
