//! Scripted in-memory chain used by unit tests.
//!
//! [`FakeChain`] answers the JSON-RPC methods of [`ChainRpc`] by emulating
//! just enough of EventFactory and TicketNFT: state getters, purchases,
//! mints and event creation, each emitting the same logs the real
//! contracts do.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, LogData, U64, U256, keccak256};
use alloy_sol_types::{Revert, SolCall, SolError, SolEvent, SolValue};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, ready};

use super::client::ReceiptPolling;
use super::contracts::{event_factory, event_factory_v1, ticket_nft};
use super::rpc::{ChainRpc, EXECUTION_REVERTED, RpcError};
use super::schema::{EventSchema, v1, v2};
use super::types::{Log, LogFilter, TransactionReceipt, TransactionRequest};
use super::ChainContext;
use crate::config::{ChainConfig, PurchaseMode};

pub(crate) fn polling() -> ReceiptPolling {
    ReceiptPolling {
        interval: Duration::from_millis(1),
        attempts: 2,
    }
}

/// One event known to the fake contract.
#[derive(Debug, Clone)]
pub(crate) struct SeedEvent {
    pub id: u64,
    pub name: String,
    pub date: u64,
    pub price: U256,
    pub total: u64,
    pub remaining: u64,
    pub metadata_cid: String,
    pub image_cid: String,
    pub organizer: Address,
}

impl SeedEvent {
    /// Upcoming event (30 days out), 0.01 ether, 100 of 100 tickets left.
    pub fn new(id: u64, metadata_cid: &str) -> Self {
        let date = chrono::Utc::now().timestamp().unsigned_abs() + 30 * 86_400;
        Self {
            id,
            name: format!("Event {id}"),
            date,
            price: U256::from(10_000_000_000_000_000u64),
            total: 100,
            remaining: 100,
            metadata_cid: metadata_cid.to_string(),
            image_cid: String::new(),
            organizer: Address::repeat_byte(0x0a),
        }
    }

    pub fn remaining(mut self, remaining: u64) -> Self {
        self.remaining = remaining;
        self
    }

    pub fn price(mut self, price: U256) -> Self {
        self.price = price;
        self
    }

    pub fn date(mut self, date: u64) -> Self {
        self.date = date;
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    block: u64,
    logs: Vec<Log>,
    events: HashMap<u64, SeedEvent>,
    legacy: HashMap<u64, SeedEvent>,
    broken_reads: HashSet<u64>,
    tokens: HashMap<u64, (Address, String)>,
    next_token: u64,
    receipts: HashMap<B256, TransactionReceipt>,
    sent: Vec<TransactionRequest>,
    log_queries: Vec<LogFilter>,
    suppress_mint_logs: bool,
    suppress_created_logs: bool,
    mint_budget: Option<u64>,
    tx_counter: u64,
    hashes: Vec<B256>,
}

/// In-memory EventFactory + TicketNFT behind the [`ChainRpc`] seam.
#[derive(Debug, Default)]
pub(crate) struct FakeChain {
    state: Mutex<FakeState>,
}

fn revert(reason: &str) -> RpcError {
    RpcError::Response {
        code: EXECUTION_REVERTED,
        message: format!("execution reverted: {reason}"),
        data: Some(
            Revert {
                reason: reason.to_string(),
            }
            .abi_encode()
            .into(),
        ),
    }
}

fn as_u64(value: U256) -> Result<u64, RpcError> {
    u64::try_from(value).map_err(|_| revert("value out of range"))
}

fn decode<C: SolCall>(data: &[u8]) -> Result<C, RpcError> {
    C::abi_decode(data).map_err(|e| RpcError::Decode(e.to_string()))
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn factory_address(&self) -> Address {
        Address::repeat_byte(0xfa)
    }

    pub fn ticket_address(&self) -> Address {
        Address::repeat_byte(0x7c)
    }

    pub fn signer(&self) -> Address {
        Address::repeat_byte(0x5e)
    }

    pub fn set_block_number(&self, block: u64) {
        self.lock().block = block;
    }

    /// Seeds a second-generation event and its `EventCreated` log.
    pub fn add_event(&self, event: SeedEvent) {
        let data = v2::EventCreated {
            eventId: U256::from(event.id),
            organizer: event.organizer,
            ipfsCID: event.metadata_cid.clone(),
            imageCID: event.image_cid.clone(),
            price: event.price,
            totalTickets: U256::from(event.total),
        }
        .encode_log_data();
        let mut state = self.lock();
        let log = make_log(self.factory_address(), data, state.block);
        state.logs.push(log);
        state.events.insert(event.id, event);
    }

    /// Seeds a first-generation event read through `events(uint256)`.
    pub fn add_legacy_event(&self, event: SeedEvent) {
        let data = v1::EventCreated {
            eventId: U256::from(event.id),
            organizer: event.organizer,
            ipfsCID: event.metadata_cid.clone(),
        }
        .encode_log_data();
        let mut state = self.lock();
        let log = make_log(self.factory_address(), data, state.block);
        state.logs.push(log);
        state.legacy.insert(event.id, event);
    }

    /// Appends an arbitrary log (e.g. one that will not decode).
    pub fn push_log(&self, log: Log) {
        self.lock().logs.push(log);
    }

    /// Makes state reads of `id` fail at the transport level.
    pub fn break_reads_of(&self, id: u64) {
        self.lock().broken_reads.insert(id);
    }

    /// Mints a ticket directly, emitting `TicketMinted`.
    pub fn mint(&self, owner: Address, event_id: u64, uri: &str) -> u64 {
        let mut state = self.lock();
        let (id, log) = mint_one(&mut state, self.ticket_address(), owner, event_id, uri);
        state.logs.push(log);
        id
    }

    pub fn suppress_mint_logs(&self) {
        self.lock().suppress_mint_logs = true;
    }

    /// Drops `EventCreated` logs from `createEvent` receipts.
    pub fn suppress_created_logs(&self) {
        self.lock().suppress_created_logs = true;
    }

    pub fn fail_mints(&self) {
        self.fail_mints_after(0);
    }

    /// Lets `count` more `mintTicket` calls succeed, then reverts the rest.
    pub fn fail_mints_after(&self, count: u64) {
        self.lock().mint_budget = Some(count);
    }

    /// Hashes of mined transactions, in send order.
    pub fn transaction_hashes(&self) -> Vec<B256> {
        self.lock().hashes.clone()
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.lock().sent.clone()
    }

    pub fn log_queries(&self) -> Vec<LogFilter> {
        self.lock().log_queries.clone()
    }

    pub fn remaining(&self, id: u64) -> Option<u64> {
        self.lock().events.get(&id).map(|e| e.remaining)
    }

    /// Event created through the first-generation `createEvent`.
    pub fn legacy_event(&self, id: u64) -> Option<SeedEvent> {
        self.lock().legacy.get(&id).cloned()
    }

    pub fn config(&self) -> ChainConfig {
        ChainConfig {
            key: "polygon".to_string(),
            name: "Polygon".to_string(),
            chain_id: 137,
            rpc_url: "http://fake.invalid".to_string(),
            event_factory: self.factory_address(),
            ticket_nft: self.ticket_address(),
            from_block: 0,
            log_block_span: None,
            event_schemas: EventSchema::ALL.to_vec(),
            purchase_mode: PurchaseMode::Atomic,
            native_symbol: "POL".to_string(),
        }
    }

    /// Chain context over this fake with the given configuration.
    pub fn context_with(self: &Arc<Self>, config: ChainConfig) -> Arc<ChainContext> {
        Arc::new(ChainContext::new(
            config,
            Arc::clone(self) as Arc<dyn ChainRpc>,
            polling(),
        ))
    }

    pub fn context(self: &Arc<Self>) -> Arc<ChainContext> {
        self.context_with(self.config())
    }

    /// Runs `tx` against the fake contracts; `commit` applies state changes
    /// and returns the emitted logs.
    fn execute(&self, tx: &TransactionRequest, commit: bool) -> Result<(Bytes, Vec<Log>), RpcError> {
        let data = tx.data.as_ref();
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| revert("missing selector"))?;
        let value = tx.value.unwrap_or(U256::ZERO);
        let sender = tx.from.unwrap_or(Address::ZERO);
        let mut state = self.lock();

        if selector == event_factory::getEventDetailsCall::SELECTOR {
            let call: event_factory::getEventDetailsCall = decode(data)?;
            let id = as_u64(call.eventId)?;
            if state.broken_reads.contains(&id) {
                return Err(RpcError::Transport("connection reset".to_string()));
            }
            let ev = state.events.get(&id).ok_or_else(|| revert("event does not exist"))?;
            let out = (
                ev.name.clone(),
                U256::from(ev.date),
                ev.price,
                U256::from(ev.total),
                U256::from(ev.remaining),
                ev.metadata_cid.clone(),
                ev.image_cid.clone(),
                ev.organizer,
            )
                .abi_encode_params();
            return Ok((out.into(), Vec::new()));
        }

        if selector == event_factory::eventsCall::SELECTOR {
            let call: event_factory::eventsCall = decode(data)?;
            let id = as_u64(call.eventId)?;
            let ev = state.legacy.get(&id).ok_or_else(|| revert("event does not exist"))?;
            let out = (
                ev.name.clone(),
                U256::from(ev.date),
                ev.metadata_cid.clone(),
                ev.organizer,
                U256::from(ev.total),
                U256::from(ev.total.saturating_sub(ev.remaining)),
            )
                .abi_encode_params();
            return Ok((out.into(), Vec::new()));
        }

        if selector == ticket_nft::tokenURICall::SELECTOR {
            let call: ticket_nft::tokenURICall = decode(data)?;
            let id = as_u64(call.tokenId)?;
            let (_, uri) = state.tokens.get(&id).ok_or_else(|| revert("nonexistent token"))?;
            return Ok(((uri.clone(),).abi_encode_params().into(), Vec::new()));
        }

        if selector == ticket_nft::ownerOfCall::SELECTOR {
            let call: ticket_nft::ownerOfCall = decode(data)?;
            let id = as_u64(call.tokenId)?;
            let (owner, _) = state.tokens.get(&id).ok_or_else(|| revert("nonexistent token"))?;
            return Ok(((*owner,).abi_encode_params().into(), Vec::new()));
        }

        if selector == event_factory::purchaseTicketsCall::SELECTOR
            || selector == event_factory::buyTicketCall::SELECTOR
        {
            let atomic = selector == event_factory::purchaseTicketsCall::SELECTOR;
            let (event_id, quantity) = if atomic {
                let call: event_factory::purchaseTicketsCall = decode(data)?;
                (as_u64(call.eventId)?, as_u64(call.quantity)?)
            } else {
                let call: event_factory::buyTicketCall = decode(data)?;
                (as_u64(call.eventId)?, as_u64(call.quantity)?)
            };
            let ev = state
                .events
                .get(&event_id)
                .ok_or_else(|| revert("event does not exist"))?;
            if quantity == 0 || ev.remaining < quantity {
                return Err(revert("not enough tickets"));
            }
            if value != ev.price * U256::from(quantity) {
                return Err(revert("incorrect payment"));
            }
            let uri = format!("ipfs://{}", ev.metadata_cid);
            if !commit {
                return Ok((Bytes::new(), Vec::new()));
            }
            if let Some(ev) = state.events.get_mut(&event_id) {
                ev.remaining -= quantity;
            }
            let mut logs = Vec::new();
            if atomic {
                for _ in 0..quantity {
                    let (_, log) = mint_one(&mut state, self.ticket_address(), sender, event_id, &uri);
                    logs.push(log);
                }
            }
            return Ok((Bytes::new(), finish_logs(&mut state, logs)));
        }

        if selector == ticket_nft::mintTicketCall::SELECTOR {
            let call: ticket_nft::mintTicketCall = decode(data)?;
            if state.mint_budget == Some(0) {
                return Err(revert("caller is not the minter"));
            }
            if !commit {
                return Ok((Bytes::new(), Vec::new()));
            }
            if let Some(budget) = state.mint_budget.as_mut() {
                *budget -= 1;
            }
            let event_id = as_u64(call.eventId)?;
            let (_, log) = mint_one(&mut state, self.ticket_address(), call.to, event_id, &call.uri);
            return Ok((Bytes::new(), finish_logs(&mut state, vec![log])));
        }

        if selector == event_factory::createEventCall::SELECTOR {
            let call: event_factory::createEventCall = decode(data)?;
            if !commit {
                return Ok((Bytes::new(), Vec::new()));
            }
            let id = next_event_id(&state);
            let total = as_u64(call.maxTickets)?;
            let event = SeedEvent {
                id,
                name: call.name,
                date: as_u64(call.date)?,
                price: call.price,
                total,
                remaining: total,
                metadata_cid: call.ipfsCID,
                image_cid: call.imageCID,
                organizer: sender,
            };
            let data = v2::EventCreated {
                eventId: U256::from(id),
                organizer: sender,
                ipfsCID: event.metadata_cid.clone(),
                imageCID: event.image_cid.clone(),
                price: event.price,
                totalTickets: U256::from(total),
            }
            .encode_log_data();
            let log = make_log(self.factory_address(), data, state.block);
            state.events.insert(id, event);
            return Ok((Bytes::new(), finish_logs(&mut state, vec![log])));
        }

        if selector == event_factory_v1::createEventCall::SELECTOR {
            let call: event_factory_v1::createEventCall = decode(data)?;
            if !commit {
                return Ok((Bytes::new(), Vec::new()));
            }
            let id = next_event_id(&state);
            let total = as_u64(call.maxTickets)?;
            let event = SeedEvent {
                id,
                name: call.name,
                date: as_u64(call.date)?,
                price: U256::ZERO,
                total,
                remaining: total,
                metadata_cid: call.ipfsCID,
                image_cid: String::new(),
                organizer: sender,
            };
            let data = v1::EventCreated {
                eventId: U256::from(id),
                organizer: sender,
                ipfsCID: event.metadata_cid.clone(),
            }
            .encode_log_data();
            let log = make_log(self.factory_address(), data, state.block);
            state.legacy.insert(id, event);
            return Ok((Bytes::new(), finish_logs(&mut state, vec![log])));
        }

        Err(revert("unknown selector"))
    }
}

/// Both generations share one id counter on the factory.
fn next_event_id(state: &FakeState) -> u64 {
    state
        .events
        .keys()
        .chain(state.legacy.keys())
        .max()
        .copied()
        .unwrap_or(0)
        + 1
}

fn make_log(address: Address, data: LogData, block: u64) -> Log {
    Log {
        address,
        topics: data.topics().to_vec(),
        data: data.data,
        block_number: Some(U64::from(block)),
        transaction_hash: None,
        log_index: None,
    }
}

fn mint_one(state: &mut FakeState, nft: Address, owner: Address, event_id: u64, uri: &str) -> (u64, Log) {
    state.next_token += 1;
    let id = state.next_token;
    state.tokens.insert(id, (owner, uri.to_string()));
    let data = ticket_nft::TicketMinted {
        tokenId: U256::from(id),
        owner,
        eventId: U256::from(event_id),
    }
    .encode_log_data();
    (id, make_log(nft, data, state.block))
}

/// Records committed logs globally and applies the log suppressions.
fn finish_logs(state: &mut FakeState, logs: Vec<Log>) -> Vec<Log> {
    let kept: Vec<Log> = logs
        .into_iter()
        .filter(|log| {
            let topic = log.topics.first();
            let mint = topic == Some(&ticket_nft::TicketMinted::SIGNATURE_HASH);
            let created = topic == Some(&v1::EventCreated::SIGNATURE_HASH)
                || topic == Some(&v2::EventCreated::SIGNATURE_HASH);
            !((state.suppress_mint_logs && mint) || (state.suppress_created_logs && created))
        })
        .collect();
    state.logs.extend(kept.iter().cloned());
    kept
}

impl ChainRpc for FakeChain {
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, RpcError>> {
        ready(Ok(137)).boxed()
    }

    fn accounts(&self) -> BoxFuture<'_, Result<Vec<Address>, RpcError>> {
        ready(Ok(vec![self.signer()])).boxed()
    }

    fn block_number(&self) -> BoxFuture<'_, Result<u64, RpcError>> {
        ready(Ok(self.lock().block)).boxed()
    }

    fn get_logs<'a>(&'a self, filter: &'a LogFilter) -> BoxFuture<'a, Result<Vec<Log>, RpcError>> {
        let mut state = self.lock();
        state.log_queries.push(filter.clone());
        let logs = state
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        ready(Ok(logs)).boxed()
    }

    fn call<'a>(&'a self, tx: &'a TransactionRequest) -> BoxFuture<'a, Result<Bytes, RpcError>> {
        ready(self.execute(tx, false).map(|(out, _)| out)).boxed()
    }

    fn send_transaction<'a>(
        &'a self,
        tx: &'a TransactionRequest,
    ) -> BoxFuture<'a, Result<B256, RpcError>> {
        self.lock().sent.push(tx.clone());
        let result = self.execute(tx, true).map(|(_, logs)| {
            let mut state = self.lock();
            state.tx_counter += 1;
            state.block += 1;
            let hash = keccak256(state.tx_counter.to_be_bytes());
            state.hashes.push(hash);
            let block = state.block;
            let logs = logs
                .into_iter()
                .map(|mut log| {
                    log.transaction_hash = Some(hash);
                    log
                })
                .collect();
            state.receipts.insert(
                hash,
                TransactionReceipt {
                    transaction_hash: hash,
                    block_number: Some(U64::from(block)),
                    status: Some(U64::from(1)),
                    logs,
                },
            );
            hash
        });
        ready(result).boxed()
    }

    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, RpcError>> {
        ready(Ok(self.lock().receipts.get(&hash).cloned())).boxed()
    }
}
