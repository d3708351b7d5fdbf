//! Payment draft validation.
//!
//! A draft is what the user typed: a recipient and a decimal amount of the
//! native token. It becomes submittable only after both fields validate.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Enter recipient and amount")]
    EmptyRecipient,

    #[error("Enter recipient and amount")]
    EmptyAmount,

    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
}

/// User-entered payment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub recipient: String,
    pub amount: String,
}

/// A draft that passed validation, amount already in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub to: Address,
    pub value: U256,
}

impl PaymentDraft {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recipient.trim().is_empty() && self.amount.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.recipient.clear();
        self.amount.clear();
    }

    /// Check both fields and convert the amount to wei.
    pub fn validate(&self) -> Result<ValidatedPayment, DraftError> {
        if self.recipient.trim().is_empty() {
            return Err(DraftError::EmptyRecipient);
        }
        if self.amount.trim().is_empty() {
            return Err(DraftError::EmptyAmount);
        }
        Ok(ValidatedPayment {
            to: validate_address(&self.recipient)?,
            value: parse_amount(&self.amount)?,
        })
    }
}

/// Validate a 20-byte hex address.
///
/// All-lowercase and all-uppercase hex is accepted as-is; mixed case must
/// carry a valid EIP-55 checksum.
pub fn validate_address(input: &str) -> Result<Address, DraftError> {
    let input = input.trim();
    let hex = input
        .strip_prefix("0x")
        .ok_or_else(|| DraftError::InvalidAddress(input.to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DraftError::InvalidAddress(input.to_string()));
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(input, None)
            .map_err(|_| DraftError::InvalidAddress(format!("{} (bad checksum)", input)));
    }

    input
        .parse()
        .map_err(|_| DraftError::InvalidAddress(input.to_string()))
}

/// Most fraction digits a native amount can carry.
const NATIVE_DECIMALS: usize = 18;

/// Parse a positive decimal native-token amount into wei (18 decimals).
///
/// Amounts finer than one wei are rejected rather than rounded.
pub fn parse_amount(input: &str) -> Result<U256, DraftError> {
    let input = input.trim();
    if input.is_empty()
        || !input.chars().all(|c| c.is_ascii_digit() || c == '.')
        || !input.chars().any(|c| c.is_ascii_digit())
    {
        return Err(DraftError::InvalidAmount(input.to_string()));
    }
    if let Some((_, fraction)) = input.split_once('.') {
        if fraction.len() > NATIVE_DECIMALS {
            return Err(DraftError::InvalidAmount(format!(
                "{}: more than {} decimal places",
                input, NATIVE_DECIMALS
            )));
        }
    }

    let wei = parse_ether(input).map_err(|e| DraftError::InvalidAmount(format!("{}: {}", input, e)))?;
    if wei.is_zero() {
        return Err(DraftError::NonPositiveAmount);
    }
    Ok(wei)
}
