//! Event-log reconstruction.
//!
//! Rebuilds display-ready events and tickets from `EventCreated` and
//! `TicketMinted` logs, the contracts' current state and the pinned
//! metadata. Per-record work fans out with `join_all`; a record whose log
//! does not decode or whose state read fails is skipped, and a failed
//! metadata fetch degrades to an empty record with the placeholder image.

use std::collections::HashSet;
use std::sync::Arc;

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use futures_util::future::join_all;

use crate::chain::contracts::ticket_nft::TicketMinted;
use crate::chain::schema::decode_created;
use crate::chain::{BlockTag, ChainContext, CreatedEventLog, Log, LogFilter, MintedTicket};
use crate::domain::{EventId, MetadataRecord, Ticket, TicketId, TicketedEvent};
use crate::error::GatewayError;
use crate::metadata::{self, ContentAddress, MetadataStore};

/// Fetches `EventCreated` logs of `chain`, optionally for one event id.
async fn created_logs(chain: &ChainContext, id: Option<EventId>) -> Result<Vec<Log>, GatewayError> {
    let config = &chain.config;
    let mut filter = LogFilter::new(config.event_factory)
        .event_signatures(config.event_schemas.iter().map(|s| s.signature_hash()))
        .block_range(BlockTag::Number(config.from_block), BlockTag::Latest);
    if let Some(id) = id {
        filter = filter.topic(1, id.as_topic());
    }
    Ok(chain.client.get_logs(&filter, config.log_block_span).await?)
}

/// Finds and decodes the `EventCreated` log of `id`.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if no decodable log exists, or
/// [`GatewayError::Rpc`] if the log query fails.
pub async fn locate_event(chain: &ChainContext, id: EventId) -> Result<CreatedEventLog, GatewayError> {
    created_logs(chain, Some(id))
        .await?
        .iter()
        .filter_map(|log| decode_created(log, &chain.config.event_schemas).ok())
        .find(|decoded| decoded.event_id == id)
        .ok_or(GatewayError::EventNotFound(id))
}

/// Joins on-chain records with metadata for one chain.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    chain: Arc<ChainContext>,
    store: Arc<dyn MetadataStore>,
    placeholder_image: String,
}

impl Reconstructor {
    /// Reconstructor over `chain`, joining metadata from `store`.
    #[must_use]
    pub fn new(
        chain: Arc<ChainContext>,
        store: Arc<dyn MetadataStore>,
        placeholder_image: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            store,
            placeholder_image: placeholder_image.into(),
        }
    }

    /// Chain this reconstructor reads.
    #[must_use]
    pub fn chain(&self) -> &Arc<ChainContext> {
        &self.chain
    }

    /// Every event with a decodable `EventCreated` log and a readable
    /// state, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rpc`] only if the log query itself fails;
    /// per-record failures are skipped.
    pub async fn events(&self) -> Result<Vec<TicketedEvent>, GatewayError> {
        let logs = created_logs(&self.chain, None).await?;
        let total = logs.len();

        let mut seen = HashSet::new();
        let decoded: Vec<CreatedEventLog> = logs
            .iter()
            .filter_map(|log| match decode_created(log, &self.chain.config.event_schemas) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(
                        chain = %self.chain.key(),
                        tx = ?log.transaction_hash,
                        error = %e,
                        "skipping undecodable EventCreated log"
                    );
                    None
                }
            })
            .filter(|decoded| seen.insert(decoded.event_id))
            .collect();

        let events: Vec<TicketedEvent> = join_all(decoded.into_iter().map(|log| self.assemble(log)))
            .await
            .into_iter()
            .flatten()
            .collect();
        tracing::debug!(chain = %self.chain.key(), logs = total, events = events.len(), "events reconstructed");
        Ok(events)
    }

    /// Reconstructs a single event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if no log exists for `id`,
    /// or the chain error raised by its state read.
    pub async fn event(&self, id: EventId) -> Result<TicketedEvent, GatewayError> {
        let log = locate_event(&self.chain, id).await?;
        let state = log.schema.read_state(&self.chain.factory, id).await?;
        Ok(self.join_event(log, state).await)
    }

    /// Tickets minted to `owner`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rpc`] only if the log query fails.
    pub async fn tickets_of(&self, owner: Address) -> Result<Vec<Ticket>, GatewayError> {
        let config = &self.chain.config;
        let filter = LogFilter::new(config.ticket_nft)
            .event_signatures([TicketMinted::SIGNATURE_HASH])
            .topic(2, owner.into_word())
            .block_range(BlockTag::Number(config.from_block), BlockTag::Latest);
        let logs = self.chain.client.get_logs(&filter, config.log_block_span).await?;

        let minted: Vec<MintedTicket> = logs
            .iter()
            .filter_map(|log| match MintedTicket::decode(log) {
                Ok(minted) => Some(minted),
                Err(e) => {
                    tracing::warn!(chain = %self.chain.key(), error = %e, "skipping undecodable TicketMinted log");
                    None
                }
            })
            .collect();

        let tickets = join_all(minted.into_iter().map(|m| async move {
            match self.chain.tickets.token_uri(m.token_id).await {
                Ok(uri) => Some(self.join_ticket(m, uri).await),
                Err(e) => {
                    tracing::warn!(chain = %self.chain.key(), token_id = %m.token_id, error = %e, "skipping ticket");
                    None
                }
            }
        }))
        .await;
        Ok(tickets.into_iter().flatten().collect())
    }

    /// A single ticket with its current owner.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TicketNotFound`] if no mint log exists, or
    /// the chain error raised by the `tokenURI`/`ownerOf` reads.
    pub async fn ticket(&self, id: TicketId) -> Result<Ticket, GatewayError> {
        let config = &self.chain.config;
        let filter = LogFilter::new(config.ticket_nft)
            .event_signatures([TicketMinted::SIGNATURE_HASH])
            .topic(1, id.as_topic())
            .block_range(BlockTag::Number(config.from_block), BlockTag::Latest);
        let logs = self.chain.client.get_logs(&filter, config.log_block_span).await?;
        let mut minted = logs
            .iter()
            .filter_map(|log| MintedTicket::decode(log).ok())
            .find(|m| m.token_id == id)
            .ok_or(GatewayError::TicketNotFound(id))?;

        let (uri, owner) = futures_util::try_join!(
            self.chain.tickets.token_uri(id),
            self.chain.tickets.owner_of(id)
        )?;
        minted.owner = owner;
        Ok(self.join_ticket(minted, uri).await)
    }

    async fn assemble(&self, log: CreatedEventLog) -> Option<TicketedEvent> {
        let id = log.event_id;
        match log.schema.read_state(&self.chain.factory, id).await {
            Ok(state) => Some(self.join_event(log, state).await),
            Err(e) => {
                tracing::warn!(chain = %self.chain.key(), event_id = %id, error = %e, "skipping event");
                None
            }
        }
    }

    async fn join_event(&self, log: CreatedEventLog, state: crate::chain::EventState) -> TicketedEvent {
        let metadata_cid = if log.metadata_cid.trim().is_empty() {
            state.metadata_cid.clone()
        } else {
            log.metadata_cid.clone()
        };
        let image_cid = state.image_cid.clone().or(log.image_cid.clone());

        let (metadata, image_url) = match self.fetch(&metadata_cid).await {
            Some(metadata) => {
                let image_url = self
                    .resolve_image(&metadata)
                    .or_else(|| {
                        image_cid
                            .as_deref()
                            .and_then(|cid| self.store.gateway().resolve_url(cid))
                    })
                    .unwrap_or_else(|| self.placeholder_image.clone());
                (metadata, image_url)
            }
            None => (MetadataRecord::default(), self.placeholder_image.clone()),
        };

        TicketedEvent {
            id: log.event_id,
            chain: self.chain.config.key.clone(),
            chain_id: self.chain.config.chain_id,
            name: state.name,
            date: state.date,
            price: state.price,
            total_tickets: state.total_tickets,
            remaining: state.remaining,
            organizer: log.organizer,
            metadata_cid,
            image_cid,
            image_url,
            metadata,
            schema: log.schema,
        }
    }

    async fn join_ticket(&self, minted: MintedTicket, token_uri: String) -> Ticket {
        let trimmed = token_uri.trim();
        let content = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            None
        } else {
            ContentAddress::parse(trimmed)
        };
        let gateway = self.store.gateway();

        let (metadata_url, metadata) = match content {
            Some(address) => {
                let url = gateway.document_url(&address);
                let metadata = self.fetch(address.as_str()).await.unwrap_or_default();
                (Some(url), metadata)
            }
            None => {
                tracing::debug!(token_id = %minted.token_id, uri = trimmed, "token URI is not content-addressed");
                (gateway.resolve_url(trimmed), MetadataRecord::default())
            }
        };
        let image_url = self
            .resolve_image(&metadata)
            .unwrap_or_else(|| self.placeholder_image.clone());

        Ticket {
            id: minted.token_id,
            chain: self.chain.config.key.clone(),
            owner: minted.owner,
            event_id: minted.event_id,
            token_uri,
            metadata_url,
            metadata,
            image_url,
        }
    }

    /// Metadata at `cid`, or `None` (logged) when it cannot be fetched.
    async fn fetch(&self, cid: &str) -> Option<MetadataRecord> {
        let Some(address) = ContentAddress::parse(cid) else {
            tracing::debug!(cid, "no metadata address, using placeholder");
            return None;
        };
        match metadata::fetch_json(self.store.as_ref(), &address).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(%address, error = %e, "metadata unavailable, using placeholder");
                None
            }
        }
    }

    fn resolve_image(&self, metadata: &MetadataRecord) -> Option<String> {
        metadata
            .image_ref()
            .and_then(|image| self.store.gateway().resolve_url(image))
    }
}
