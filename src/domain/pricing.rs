//! Wei arithmetic and ether formatting.
//!
//! Prices are `U256` wei end to end. Decimal strings only appear at the
//! API boundary.

use alloy_primitives::U256;
use alloy_primitives::utils::{format_ether, parse_ether};

/// Price input that is not a non-negative decimal ether amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ether amount {input:?}: {reason}")]
pub struct PriceError {
    /// Rejected input.
    pub input: String,
    /// Parser message.
    pub reason: String,
}

/// `price × quantity`, or `None` on `U256` overflow.
#[must_use]
pub fn aggregate_price(price: U256, quantity: u64) -> Option<U256> {
    price.checked_mul(U256::from(quantity))
}

/// Parses a decimal ether string (`"0.05"`) into wei.
///
/// # Errors
///
/// Returns [`PriceError`] for empty, negative, malformed or over-precise
/// input.
pub fn parse_ether_amount(input: &str) -> Result<U256, PriceError> {
    let trimmed = input.trim();
    let reject = |reason: String| PriceError {
        input: input.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(reject("empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(reject("negative".to_string()));
    }
    parse_ether(trimmed).map_err(|e| reject(e.to_string()))
}

/// Formats wei as a decimal ether string without trailing zeros
/// (`10000000000000000` → `"0.01"`).
#[must_use]
pub fn format_ether_amount(wei: U256) -> String {
    let full = format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => full,
    }
}
