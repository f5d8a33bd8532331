//! Chain-side records used by the gateway: log filters, logs, call
//! requests and receipts.
//!
//! These are the projections the [`super::rpc::ChainRpc`] seam speaks. The
//! provider converts them to and from the `alloy-rpc-types-eth` wire types.

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use alloy_rpc_types_eth as rpc;
use alloy_rpc_types_eth::{BlockNumberOrTag, Filter, TransactionInput};

/// Block bound of a log query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// A concrete block height.
    Number(u64),
    /// The chain head at query time.
    Latest,
}

impl BlockTag {
    const fn to_rpc(self) -> BlockNumberOrTag {
        match self {
            Self::Number(n) => BlockNumberOrTag::Number(n),
            Self::Latest => BlockNumberOrTag::Latest,
        }
    }

    fn admits(self, block: u64, upper: bool) -> bool {
        match (self, upper) {
            (Self::Latest, _) => true,
            (Self::Number(n), true) => block <= n,
            (Self::Number(n), false) => block >= n,
        }
    }
}

/// Topic matcher at one position of a log filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicFilter {
    /// Matches any value (serialized as `null`).
    Any,
    /// Matches any of the listed values.
    OneOf(Vec<B256>),
}

impl TopicFilter {
    fn admits(&self, topic: Option<&B256>) -> bool {
        match self {
            Self::Any => true,
            Self::OneOf(values) => topic.is_some_and(|t| values.contains(t)),
        }
    }
}

/// Parameters of an `eth_getLogs` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract.
    pub address: Address,
    /// Positional topic matchers; missing trailing positions match anything.
    pub topics: Vec<TopicFilter>,
    /// First block (inclusive).
    pub from_block: BlockTag,
    /// Last block (inclusive).
    pub to_block: BlockTag,
}

impl LogFilter {
    /// Filter over every log of `address` from genesis to the chain head.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            topics: Vec::new(),
            from_block: BlockTag::Number(0),
            to_block: BlockTag::Latest,
        }
    }

    /// Restricts topic 0 to any of the given event signature hashes.
    #[must_use]
    pub fn event_signatures(self, signatures: impl IntoIterator<Item = B256>) -> Self {
        self.topic_one_of(0, signatures.into_iter().collect())
    }

    /// Requires topic `index` to equal `value`.
    #[must_use]
    pub fn topic(self, index: usize, value: B256) -> Self {
        self.topic_one_of(index, vec![value])
    }

    fn topic_one_of(mut self, index: usize, values: Vec<B256>) -> Self {
        if self.topics.len() <= index {
            self.topics.resize(index + 1, TopicFilter::Any);
        }
        if let Some(slot) = self.topics.get_mut(index) {
            *slot = TopicFilter::OneOf(values);
        }
        self
    }

    /// Sets the inclusive block range.
    #[must_use]
    pub const fn block_range(mut self, from: BlockTag, to: BlockTag) -> Self {
        self.from_block = from;
        self.to_block = to;
        self
    }

    /// The `eth_getLogs` filter object. Topic positions past the fourth
    /// are not expressible and are dropped.
    #[must_use]
    pub fn to_rpc(&self) -> Filter {
        let mut filter = Filter::new()
            .address(self.address)
            .from_block(self.from_block.to_rpc())
            .to_block(self.to_block.to_rpc());
        for (slot, topic) in filter.topics.iter_mut().zip(&self.topics) {
            if let TopicFilter::OneOf(values) = topic {
                *slot = values.clone().into();
            }
        }
        filter
    }

    /// Returns `true` if `log` would be returned by a node for this filter.
    #[must_use]
    pub fn matches(&self, log: &Log) -> bool {
        if log.address != self.address {
            return false;
        }
        let topics_match = self
            .topics
            .iter()
            .enumerate()
            .all(|(i, filter)| filter.admits(log.topics.get(i)));
        let block = log.block_number.map(|b| b.to::<u64>());
        let in_range = block.is_none_or(|b| {
            self.from_block.admits(b, false) && self.to_block.admits(b, true)
        });
        topics_match && in_range
    }
}

/// A log record as returned by `eth_getLogs` or inside a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics; topic 0 is the event signature hash.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields.
    pub data: Bytes,
    /// Block the log was included in.
    pub block_number: Option<U64>,
    /// Transaction that emitted the log.
    pub transaction_hash: Option<B256>,
    /// Position of the log in its block.
    pub log_index: Option<U64>,
}

impl From<rpc::Log> for Log {
    fn from(log: rpc::Log) -> Self {
        let topics = log.inner.data.topics().to_vec();
        Self {
            address: log.inner.address,
            topics,
            data: log.inner.data.data,
            block_number: log.block_number.map(U64::from),
            transaction_hash: log.transaction_hash,
            log_index: log.log_index.map(U64::from),
        }
    }
}

/// Call or transaction request (`eth_call`, `eth_sendTransaction`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sending account; must be unlocked on the node for sends.
    pub from: Option<Address>,
    /// Target contract.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
    /// Attached native value in wei.
    pub value: Option<U256>,
}

impl TransactionRequest {
    /// The wire request. Calldata goes out as both `input` and `data` for
    /// nodes that only read the legacy field.
    #[must_use]
    pub fn to_rpc(&self) -> rpc::TransactionRequest {
        let mut request = rpc::TransactionRequest::default()
            .to(self.to)
            .input(TransactionInput::both(self.data.clone()));
        if let Some(from) = self.from {
            request = request.from(from);
        }
        if let Some(value) = self.value {
            request = request.value(value);
        }
        request
    }
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// Block the transaction was mined in.
    pub block_number: Option<U64>,
    /// `1` on success, `0` on revert (absent before Byzantium).
    pub status: Option<U64>,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Returns `false` only when the node reports a reverted status.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|s| s != U64::ZERO)
    }

    /// Logs emitted by `address`.
    pub fn logs_from(&self, address: Address) -> impl Iterator<Item = &Log> {
        self.logs.iter().filter(move |log| log.address == address)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn log(address: Address, topics: Vec<B256>, block: u64) -> Log {
        Log {
            address,
            topics,
            data: Bytes::new(),
            block_number: Some(U64::from(block)),
            transaction_hash: None,
            log_index: None,
        }
    }

    #[test]
    fn rpc_filter_renders_hex_blocks_and_null_topics() {
        let filter = LogFilter::new(addr(1))
            .topic(2, B256::repeat_byte(9))
            .block_range(BlockTag::Number(16), BlockTag::Latest);
        let Ok(params) = serde_json::to_value(filter.to_rpc()) else {
            panic!("filter should serialize");
        };
        assert_eq!(params["fromBlock"], "0x10");
        assert_eq!(params["toBlock"], "latest");
        assert!(params["topics"][0].is_null());
        assert!(params["topics"][1].is_null());
        assert!(params["topics"][2].is_string());
    }

    #[test]
    fn multiple_signatures_render_as_array() {
        let filter = LogFilter::new(addr(1))
            .event_signatures([B256::repeat_byte(1), B256::repeat_byte(2)]);
        let Ok(params) = serde_json::to_value(filter.to_rpc()) else {
            panic!("filter should serialize");
        };
        assert_eq!(params["topics"][0].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn request_carries_calldata_and_value() {
        let request = TransactionRequest {
            from: Some(addr(5)),
            to: addr(6),
            data: Bytes::from_static(&[0xab, 0xcd]),
            value: Some(U256::from(7u8)),
        };
        let Ok(json) = serde_json::to_value(request.to_rpc()) else {
            panic!("request should serialize");
        };
        assert_eq!(json["input"], "0xabcd");
        assert_eq!(json["data"], "0xabcd");
        assert_eq!(json["value"], "0x7");
        assert_eq!(json["to"], format!("{:#x}", addr(6)));
    }

    #[test]
    fn matches_checks_address_topics_and_range() {
        let sig = B256::repeat_byte(7);
        let filter = LogFilter::new(addr(1))
            .event_signatures([sig])
            .block_range(BlockTag::Number(10), BlockTag::Number(20));

        assert!(filter.matches(&log(addr(1), vec![sig], 15)));
        assert!(!filter.matches(&log(addr(2), vec![sig], 15)));
        assert!(!filter.matches(&log(addr(1), vec![B256::ZERO], 15)));
        assert!(!filter.matches(&log(addr(1), vec![sig], 21)));
        assert!(!filter.matches(&log(addr(1), vec![], 15)));
    }

    #[test]
    fn receipt_status_zero_is_failure() {
        let mut receipt = TransactionReceipt {
            transaction_hash: B256::ZERO,
            block_number: None,
            status: Some(U64::ZERO),
            logs: Vec::new(),
        };
        assert!(!receipt.succeeded());
        receipt.status = Some(U64::from(1));
        assert!(receipt.succeeded());
        receipt.status = None;
        assert!(receipt.succeeded());
    }
}
