//! Chain client: typed reads, chunked log queries and confirmed sends.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;

use super::revert::revert_reason;
use super::rpc::{ChainRpc, RpcError};
use super::types::{BlockTag, Log, LogFilter, TransactionReceipt, TransactionRequest};

/// Errors raised by [`ChainClient`] and the contract gateways.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Node unreachable or returned a non-revert error.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The node exposes no account to sign with.
    #[error("no signing account available on the node")]
    NoSigner,

    /// A call or transaction reverted.
    #[error("execution reverted: {reason}")]
    Reverted {
        /// Decoded revert reason or node message.
        reason: String,
        /// Hash of the mined transaction, when the revert happened on-chain.
        transaction: Option<B256>,
    },

    /// Return data did not match the expected ABI.
    #[error("undecodable return data from {method}: {message}")]
    Abi {
        /// Solidity signature of the called function.
        method: &'static str,
        /// Decoder error.
        message: String,
    },

    /// Contract state contradicts an invariant (e.g. remaining > total).
    #[error("inconsistent contract state: {0}")]
    InconsistentState(String),

    /// Receipt still unavailable after the configured polling budget.
    #[error("transaction {0} not mined after polling")]
    ReceiptTimeout(B256),
}

impl ChainError {
    fn from_rpc(err: RpcError, transaction: Option<B256>) -> Self {
        if err.is_revert() {
            Self::Reverted {
                reason: revert_reason(&err),
                transaction,
            }
        } else {
            Self::Rpc(err)
        }
    }
}

/// Receipt polling budget for confirmed sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
    /// Delay between `eth_getTransactionReceipt` polls.
    pub interval: Duration,
    /// Maximum number of polls.
    pub attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            attempts: 120,
        }
    }
}

/// Thin client over a [`ChainRpc`] provider.
#[derive(Debug, Clone)]
pub struct ChainClient {
    rpc: Arc<dyn ChainRpc>,
    polling: ReceiptPolling,
}

impl ChainClient {
    /// Creates a client over `rpc`.
    #[must_use]
    pub fn new(rpc: Arc<dyn ChainRpc>, polling: ReceiptPolling) -> Self {
        Self { rpc, polling }
    }

    /// Underlying provider.
    #[must_use]
    pub fn rpc(&self) -> &Arc<dyn ChainRpc> {
        &self.rpc
    }

    /// First account the node can sign for.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NoSigner`] if the node exposes no accounts, or
    /// [`ChainError::Rpc`] on transport failure.
    pub async fn signer_address(&self) -> Result<Address, ChainError> {
        let accounts = self.rpc.accounts().await?;
        accounts.first().copied().ok_or(ChainError::NoSigner)
    }

    /// Executes a read-only call and decodes its return value.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Reverted`] if the call reverts,
    /// [`ChainError::Abi`] if the return data does not decode, or
    /// [`ChainError::Rpc`] on transport failure.
    pub async fn read<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return, ChainError> {
        let request = TransactionRequest {
            from: None,
            to,
            data: call.abi_encode().into(),
            value: None,
        };
        let output = self
            .rpc
            .call(&request)
            .await
            .map_err(|e| ChainError::from_rpc(e, None))?;
        C::abi_decode_returns(&output).map_err(|e| ChainError::Abi {
            method: C::SIGNATURE,
            message: e.to_string(),
        })
    }

    /// Queries logs, splitting the block range into windows of `span`
    /// blocks when given.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Rpc`] if any window fails; partial results are
    /// discarded.
    pub async fn get_logs(&self, filter: &LogFilter, span: Option<u64>) -> Result<Vec<Log>, ChainError> {
        let Some(span) = span.filter(|s| *s > 0) else {
            return Ok(self.rpc.get_logs(filter).await?);
        };

        let head = match (filter.from_block, filter.to_block) {
            (_, BlockTag::Number(n)) => n,
            _ => self.rpc.block_number().await?,
        };
        let mut start = match filter.from_block {
            BlockTag::Number(n) => n,
            BlockTag::Latest => head,
        };

        let mut logs = Vec::new();
        while start <= head {
            let end = start.saturating_add(span - 1).min(head);
            let window = filter
                .clone()
                .block_range(BlockTag::Number(start), BlockTag::Number(end));
            logs.extend(self.rpc.get_logs(&window).await?);
            if end == u64::MAX {
                break;
            }
            start = end + 1;
        }
        Ok(logs)
    }

    /// Sends a state-changing call from `from` and waits for its receipt.
    ///
    /// The call is simulated with `eth_call` first so that a revert is
    /// reported with its reason and nothing is broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Reverted`] on a simulated or mined revert,
    /// [`ChainError::ReceiptTimeout`] if the transaction is not mined in
    /// time, or [`ChainError::Rpc`] on transport failure.
    pub async fn send<C: SolCall>(
        &self,
        from: Address,
        to: Address,
        call: &C,
        value: U256,
    ) -> Result<TransactionReceipt, ChainError> {
        let request = TransactionRequest {
            from: Some(from),
            to,
            data: call.abi_encode().into(),
            value: (!value.is_zero()).then_some(value),
        };

        self.rpc
            .call(&request)
            .await
            .map_err(|e| ChainError::from_rpc(e, None))?;

        let hash = self
            .rpc
            .send_transaction(&request)
            .await
            .map_err(|e| ChainError::from_rpc(e, None))?;
        tracing::debug!(method = C::SIGNATURE, tx = %hash, "transaction submitted");

        let receipt = self.wait_for_receipt(hash).await?;
        if !receipt.succeeded() {
            return Err(ChainError::Reverted {
                reason: "transaction reverted on-chain".to_string(),
                transaction: Some(hash),
            });
        }
        Ok(receipt)
    }

    /// Polls for the receipt of `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::ReceiptTimeout`] when the polling budget is
    /// exhausted, or [`ChainError::Rpc`] on transport failure.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt, ChainError> {
        for attempt in 0..self.polling.attempts.max(1) {
            if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            if attempt + 1 < self.polling.attempts {
                tokio::time::sleep(self.polling.interval).await;
            }
        }
        Err(ChainError::ReceiptTimeout(hash))
    }
}
