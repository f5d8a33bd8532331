//! Provider abstraction over an Ethereum JSON-RPC endpoint.
//!
//! [`ChainRpc`] is the seam between the gateway and a node. The alloy
//! provider implementation lives in [`super::provider`]; unit tests
//! substitute a scripted in-memory chain.

use std::fmt;

use alloy_primitives::{Address, B256, Bytes};
use futures_util::future::BoxFuture;

use super::types::{Log, LogFilter, TransactionReceipt, TransactionRequest};

/// JSON-RPC error code used by geth, anvil and hardhat for execution reverts.
pub const EXECUTION_REVERTED: i64 = 3;

/// Errors returned by a [`ChainRpc`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The node could not be reached or the HTTP exchange failed.
    #[error("rpc transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Response {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
        /// Raw revert payload when the node attaches one.
        data: Option<Bytes>,
    },

    /// The node answered with a result that does not have the expected shape.
    #[error("malformed rpc response: {0}")]
    Decode(String),

    /// The node serves a different chain than the one configured.
    #[error("node reports chain id {reported}, expected {expected}")]
    ChainIdMismatch {
        /// Configured chain id.
        expected: u64,
        /// Chain id returned by `eth_chainId`.
        reported: u64,
    },
}

impl RpcError {
    /// Returns `true` if the error reports an EVM execution revert.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        match self {
            Self::Response {
                code,
                message,
                data,
            } => {
                *code == EXECUTION_REVERTED
                    || data.is_some()
                    || message.to_ascii_lowercase().contains("revert")
            }
            _ => false,
        }
    }

    /// Raw revert payload, if the node attached one.
    #[must_use]
    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            Self::Response { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Message reported by the node, if any.
    #[must_use]
    pub fn node_message(&self) -> Option<&str> {
        match self {
            Self::Response { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Minimal set of JSON-RPC methods used by the gateway.
///
/// Methods return boxed futures so the trait stays object-safe and can be
/// shared as `Arc<dyn ChainRpc>` across handlers.
pub trait ChainRpc: Send + Sync + fmt::Debug {
    /// `eth_chainId`.
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, RpcError>>;

    /// `eth_accounts`: accounts the node can sign for.
    fn accounts(&self) -> BoxFuture<'_, Result<Vec<Address>, RpcError>>;

    /// `eth_blockNumber`.
    fn block_number(&self) -> BoxFuture<'_, Result<u64, RpcError>>;

    /// `eth_getLogs`.
    fn get_logs<'a>(&'a self, filter: &'a LogFilter) -> BoxFuture<'a, Result<Vec<Log>, RpcError>>;

    /// `eth_call` against the latest block.
    fn call<'a>(&'a self, tx: &'a TransactionRequest) -> BoxFuture<'a, Result<Bytes, RpcError>>;

    /// `eth_sendTransaction`, signed by the node.
    fn send_transaction<'a>(
        &'a self,
        tx: &'a TransactionRequest,
    ) -> BoxFuture<'a, Result<B256, RpcError>>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, RpcError>>;
}
