//! [`ChainRpc`] over an `alloy-provider` HTTP provider.
//!
//! The provider is built without fillers: the node signs with its own
//! unlocked account, so gas, nonce and chain id are left for it to fill.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use alloy_json_rpc::RpcError as JsonRpcError;
use alloy_primitives::{Address, B256, Bytes, U64};
use alloy_provider::network::ReceiptResponse;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::BlockId;
use alloy_transport::TransportError;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::rpc::{ChainRpc, RpcError};
use super::types::{Log, LogFilter, TransactionReceipt, TransactionRequest};

/// Node access through an erased alloy HTTP provider.
#[derive(Clone)]
pub struct AlloyRpc {
    provider: DynProvider,
    url: String,
    timeout: Duration,
}

impl fmt::Debug for AlloyRpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyRpc")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AlloyRpc {
    /// Connects an HTTP provider to the node at `url`. Every request is
    /// bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Transport`] if `url` is not a valid URL.
    pub fn connect(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let url = url.into();
        let endpoint: reqwest::Url = url
            .parse()
            .map_err(|e| RpcError::Transport(format!("invalid rpc url {url:?}: {e}")))?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(endpoint)
            .erased();
        Ok(Self {
            provider,
            url,
            timeout,
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn bounded<T>(
        &self,
        method: &'static str,
        request: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, RpcError> {
        tracing::trace!(method, url = %self.url, "rpc request");
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(rpc_error),
            Err(_) => Err(RpcError::Transport(format!(
                "{method} timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

/// Folds an alloy transport error into the gateway's [`RpcError`] kinds.
fn rpc_error(err: TransportError) -> RpcError {
    match err {
        JsonRpcError::ErrorResp(payload) => {
            let data = payload.as_revert_data();
            RpcError::Response {
                code: payload.code,
                message: payload.message.into_owned(),
                data,
            }
        }
        JsonRpcError::DeserError { err, .. } => RpcError::Decode(err.to_string()),
        JsonRpcError::NullResp => RpcError::Decode("null response".to_string()),
        other => RpcError::Transport(other.to_string()),
    }
}

fn receipt(receipt: &alloy_rpc_types_eth::TransactionReceipt) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: receipt.transaction_hash(),
        block_number: receipt.block_number().map(U64::from),
        status: Some(U64::from(u8::from(receipt.status()))),
        logs: receipt.inner.logs().iter().cloned().map(Log::from).collect(),
    }
}

impl ChainRpc for AlloyRpc {
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, RpcError>> {
        async move {
            self.bounded("eth_chainId", self.provider.get_chain_id().into_future())
                .await
        }
        .boxed()
    }

    fn accounts(&self) -> BoxFuture<'_, Result<Vec<Address>, RpcError>> {
        async move {
            self.bounded("eth_accounts", self.provider.get_accounts().into_future())
                .await
        }
        .boxed()
    }

    fn block_number(&self) -> BoxFuture<'_, Result<u64, RpcError>> {
        async move {
            self.bounded(
                "eth_blockNumber",
                self.provider.get_block_number().into_future(),
            )
            .await
        }
        .boxed()
    }

    fn get_logs<'a>(&'a self, filter: &'a LogFilter) -> BoxFuture<'a, Result<Vec<Log>, RpcError>> {
        async move {
            let filter = filter.to_rpc();
            let logs = self
                .bounded("eth_getLogs", self.provider.get_logs(&filter))
                .await?;
            Ok(logs.into_iter().map(Log::from).collect())
        }
        .boxed()
    }

    fn call<'a>(&'a self, tx: &'a TransactionRequest) -> BoxFuture<'a, Result<Bytes, RpcError>> {
        async move {
            let call = self.provider.call(tx.to_rpc()).block(BlockId::latest());
            self.bounded("eth_call", call.into_future()).await
        }
        .boxed()
    }

    fn send_transaction<'a>(
        &'a self,
        tx: &'a TransactionRequest,
    ) -> BoxFuture<'a, Result<B256, RpcError>> {
        async move {
            let pending = self
                .bounded(
                    "eth_sendTransaction",
                    self.provider.send_transaction(tx.to_rpc()),
                )
                .await?;
            Ok(*pending.tx_hash())
        }
        .boxed()
    }

    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, RpcError>> {
        async move {
            let found = self
                .bounded(
                    "eth_getTransactionReceipt",
                    self.provider.get_transaction_receipt(hash).into_future(),
                )
                .await?;
            Ok(found.as_ref().map(receipt))
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use alloy_json_rpc::ErrorPayload;

    #[test]
    fn error_object_keeps_code_and_revert_payload() {
        let payload: Result<ErrorPayload, _> = serde_json::from_str(
            r#"{"code":3,"message":"execution reverted","data":"0x08c379a0"}"#,
        );
        let Ok(payload) = payload else {
            panic!("payload should deserialize");
        };
        let err = rpc_error(JsonRpcError::ErrorResp(payload));
        assert!(err.is_revert());
        assert_eq!(err.revert_data().map(|b| b.len()), Some(4));
    }

    #[test]
    fn null_response_is_decode_error() {
        assert!(matches!(
            rpc_error(JsonRpcError::NullResp),
            RpcError::Decode(_)
        ));
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(
            AlloyRpc::connect("not a url", Duration::from_secs(1)),
            Err(RpcError::Transport(_))
        ));
    }
}
