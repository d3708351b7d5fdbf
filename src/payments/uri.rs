//! Payment request URIs for wallets that scan QR codes.
//!
//! Format: `ethereum:<address>@<chainId>[?value=<wei>]`. The address is
//! written exactly as given; only the amount is converted.

use crate::payments::draft::{self, DraftError};

pub const SCHEME: &str = "ethereum";

/// Build a payment URI.
///
/// A missing or blank `amount` leaves out `value`. A present amount must be
/// a positive decimal.
pub fn build_payment_uri(address: &str, chain_id: u64, amount: Option<&str>) -> Result<String, DraftError> {
    let mut uri = format!("{}:{}@{}", SCHEME, address, chain_id);

    if let Some(amount) = amount.map(str::trim).filter(|a| !a.is_empty()) {
        let wei = draft::parse_amount(amount)?;
        uri.push_str(&format!("?value={}", wei));
    }

    Ok(uri)
}
