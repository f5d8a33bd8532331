//! Revert reason decoding.

use alloy_primitives::hex;
use alloy_sol_types::{Panic, Revert, SolError};

use super::rpc::RpcError;

/// Decodes the human-readable reason from raw revert data.
///
/// Handles `Error(string)` and `Panic(uint256)`; any other selector is
/// reported as a custom error with its hex selector. Returns `None` for
/// empty data.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if let Ok(revert) = Revert::abi_decode(data) {
        return Some(revert.reason);
    }
    if let Ok(panic) = Panic::abi_decode(data) {
        return Some(format!("panic code {:#x}", panic.code));
    }
    let selector = data.get(..4).unwrap_or(data);
    Some(format!("custom error 0x{}", hex::encode(selector)))
}

/// Best available revert reason for an RPC error.
///
/// Prefers the decoded payload and falls back to the node's message with
/// the usual `execution reverted: ` prefix removed.
#[must_use]
pub fn revert_reason(err: &RpcError) -> String {
    if let Some(reason) = err.revert_data().and_then(|d| decode_revert_reason(d)) {
        return reason;
    }
    let message = err.node_message().unwrap_or("execution reverted");
    message
        .strip_prefix("execution reverted: ")
        .unwrap_or(message)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256};

    #[test]
    fn decodes_error_string() {
        let data = Revert {
            reason: "sold out".to_string(),
        }
        .abi_encode();
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("sold out"));
    }

    #[test]
    fn decodes_panic_code() {
        let data = Panic {
            code: U256::from(0x11),
        }
        .abi_encode();
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("panic code 0x11")
        );
    }

    #[test]
    fn unknown_selector_is_custom_error() {
        let data = [0xde, 0xad, 0xbe, 0xef, 0, 0];
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("custom error 0xdeadbeef")
        );
        assert!(decode_revert_reason(&[]).is_none());
    }

    #[test]
    fn falls_back_to_node_message() {
        let err = RpcError::Response {
            code: 3,
            message: "execution reverted: not organizer".to_string(),
            data: Some(Bytes::new()),
        };
        assert_eq!(revert_reason(&err), "not organizer");
    }
}
