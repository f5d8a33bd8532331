//! REST endpoint handlers organized by resource.

pub mod events;
pub mod metadata;
pub mod purchase;
pub mod system;
pub mod tickets;

use alloy_primitives::Address;
use axum::Router;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(purchase::routes())
        .merge(tickets::routes())
        .merge(metadata::routes())
}

/// Parses a hex address from request input.
pub(crate) fn parse_address(field: &str, raw: &str) -> Result<Address, GatewayError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid {field} {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_parse_with_or_without_checksum() {
        assert!(parse_address("buyer", "0x000000000000000000000000000000000000dEaD").is_ok());
        assert!(parse_address("buyer", " 0x000000000000000000000000000000000000dead ").is_ok());
        assert!(matches!(
            parse_address("buyer", "0xnope"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
