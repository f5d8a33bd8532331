//! Per-chain clients keyed by configuration name.
//!
//! A [`ChainContext`] bundles one chain's configuration with its client and
//! contract gateways; [`ChainRegistry`] maps chain keys (`polygon`,
//! `amoy`, ...) to contexts. Both are immutable once built and shared
//! behind `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::client::{ChainClient, ReceiptPolling};
use super::contracts::{EventFactory, TicketNft};
use super::provider::AlloyRpc;
use super::rpc::{ChainRpc, RpcError};
use crate::config::ChainConfig;
use crate::error::GatewayError;

/// One configured chain: settings, client and contract gateways.
#[derive(Debug)]
pub struct ChainContext {
    /// Chain settings.
    pub config: ChainConfig,
    /// Provider-backed client.
    pub client: ChainClient,
    /// EventFactory gateway.
    pub factory: EventFactory,
    /// TicketNFT gateway.
    pub tickets: TicketNft,
}

impl ChainContext {
    /// Builds the client and gateways for `config` over `rpc`.
    #[must_use]
    pub fn new(config: ChainConfig, rpc: Arc<dyn ChainRpc>, polling: ReceiptPolling) -> Self {
        let client = ChainClient::new(rpc, polling);
        let factory = EventFactory::new(client.clone(), config.event_factory);
        let tickets = TicketNft::new(client.clone(), config.ticket_nft);
        Self {
            config,
            client,
            factory,
            tickets,
        }
    }

    /// Configuration key (e.g. `polygon`).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// Compares the node's `eth_chainId` with the configured id.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] if the node cannot be reached or answers
    /// garbage, and [`RpcError::ChainIdMismatch`] if it serves another
    /// chain.
    pub async fn verify_chain_id(&self) -> Result<(), RpcError> {
        let reported = self.client.rpc().chain_id().await?;
        if reported != self.config.chain_id {
            return Err(RpcError::ChainIdMismatch {
                expected: self.config.chain_id,
                reported,
            });
        }
        Ok(())
    }
}

/// Lookup of configured chains by key.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<String, Arc<ChainContext>>,
}

impl ChainRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an alloy HTTP provider context for every configured chain.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Transport`] if an RPC URL does not parse.
    pub fn connect(
        chains: &[ChainConfig],
        timeout: Duration,
        polling: ReceiptPolling,
    ) -> Result<Self, RpcError> {
        let mut registry = Self::new();
        for config in chains {
            let rpc = AlloyRpc::connect(config.rpc_url.clone(), timeout)?;
            registry.insert(ChainContext::new(config.clone(), Arc::new(rpc), polling));
        }
        Ok(registry)
    }

    /// Adds or replaces the context registered under its key.
    pub fn insert(&mut self, context: ChainContext) {
        self.chains
            .insert(context.config.key.clone(), Arc::new(context));
    }

    /// Adds an already shared context.
    pub fn insert_shared(&mut self, context: Arc<ChainContext>) {
        self.chains.insert(context.config.key.clone(), context);
    }

    /// Context for `key` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChainNotFound`] if the chain is not
    /// configured.
    pub fn get(&self, key: &str) -> Result<Arc<ChainContext>, GatewayError> {
        self.chains
            .get(&key.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| GatewayError::ChainNotFound(key.to_string()))
    }

    /// All contexts, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChainContext>> {
        self.chains.values()
    }

    /// Number of configured chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chain is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
