//! Ticketing service: per-chain orchestration and event emission.

use std::sync::Arc;

use alloy_primitives::Address;
use chrono::Utc;

use super::hosting::{self, HostedEvent, NewEvent};
use super::purchase::{self, PurchaseQuote, PurchaseReceipt};
use super::reconstructor::Reconstructor;
use crate::chain::{ChainContext, ChainRegistry};
use crate::domain::{
    EventBus, EventId, EventQuery, MetadataRecord, Ticket, TicketId, TicketedEvent, TicketingEvent,
};
use crate::error::GatewayError;
use crate::metadata::{self, ContentAddress, MetadataStore};

/// Orchestration layer behind the REST and WebSocket handlers.
///
/// Stateless coordinator: owns the [`ChainRegistry`], the metadata store
/// and the [`EventBus`]. Every write follows the pattern: resolve chain →
/// validate → send and confirm → emit event → return result.
#[derive(Debug, Clone)]
pub struct TicketingService {
    chains: Arc<ChainRegistry>,
    store: Arc<dyn MetadataStore>,
    event_bus: EventBus,
    placeholder_image: String,
}

impl TicketingService {
    /// Creates a new `TicketingService`.
    #[must_use]
    pub fn new(
        chains: Arc<ChainRegistry>,
        store: Arc<dyn MetadataStore>,
        event_bus: EventBus,
        placeholder_image: impl Into<String>,
    ) -> Self {
        Self {
            chains,
            store,
            event_bus,
            placeholder_image: placeholder_image.into(),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`ChainRegistry`].
    #[must_use]
    pub fn chains(&self) -> &Arc<ChainRegistry> {
        &self.chains
    }

    /// Returns the metadata store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    fn chain(&self, key: &str) -> Result<Arc<ChainContext>, GatewayError> {
        self.chains.get(key)
    }

    fn reconstructor(&self, key: &str) -> Result<Reconstructor, GatewayError> {
        Ok(Reconstructor::new(
            self.chain(key)?,
            Arc::clone(&self.store),
            self.placeholder_image.clone(),
        ))
    }

    /// Reconstructed events of `chain` that pass `query`, sorted by date.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChainNotFound`] or the log query failure.
    pub async fn list_events(
        &self,
        chain: &str,
        query: &EventQuery,
    ) -> Result<Vec<TicketedEvent>, GatewayError> {
        let events = self.reconstructor(chain)?.events().await?;
        Ok(query.apply(events, Utc::now()))
    }

    /// One reconstructed event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChainNotFound`],
    /// [`GatewayError::EventNotFound`] or the state read failure.
    pub async fn get_event(&self, chain: &str, id: EventId) -> Result<TicketedEvent, GatewayError> {
        self.reconstructor(chain)?.event(id).await
    }

    /// Tickets minted to `owner`, ordered by token id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChainNotFound`] or the log query failure.
    pub async fn tickets_of(&self, chain: &str, owner: Address) -> Result<Vec<Ticket>, GatewayError> {
        let mut tickets = self.reconstructor(chain)?.tickets_of(owner).await?;
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }

    /// One ticket with its current owner.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChainNotFound`],
    /// [`GatewayError::TicketNotFound`] or the read failure.
    pub async fn get_ticket(&self, chain: &str, id: TicketId) -> Result<Ticket, GatewayError> {
        self.reconstructor(chain)?.ticket(id).await
    }

    /// Prices a prospective purchase.
    ///
    /// # Errors
    ///
    /// See [`purchase::quote`].
    pub async fn quote(
        &self,
        chain: &str,
        id: EventId,
        quantity: u64,
    ) -> Result<PurchaseQuote, GatewayError> {
        purchase::quote(&*self.chain(chain)?, id, quantity).await
    }

    /// Buys tickets and publishes [`TicketingEvent::TicketsPurchased`].
    ///
    /// # Errors
    ///
    /// See [`purchase::purchase`].
    pub async fn purchase(
        &self,
        chain: &str,
        id: EventId,
        quantity: u64,
        buyer: Option<Address>,
    ) -> Result<PurchaseReceipt, GatewayError> {
        let context = self.chain(chain)?;
        let receipt = purchase::purchase(&context, id, quantity, buyer).await?;

        let _ = self.event_bus.publish(TicketingEvent::TicketsPurchased {
            chain: context.config.key.clone(),
            event_id: id,
            buyer: receipt.buyer.to_string(),
            quantity: receipt.token_ids.len() as u64,
            token_ids: receipt.token_ids.iter().map(|t| t.get()).collect(),
            total_paid_wei: receipt.total_paid.to_string(),
            transaction_hashes: receipt.transactions.iter().map(ToString::to_string).collect(),
            timestamp: Utc::now(),
        });

        tracing::info!(chain = %context.key(), event_id = %id, minted = receipt.token_ids.len(), "tickets purchased");
        Ok(receipt)
    }

    /// Hosts a new event and publishes [`TicketingEvent::EventCreated`].
    ///
    /// # Errors
    ///
    /// See [`hosting::create_event`].
    pub async fn create_event(&self, chain: &str, input: &NewEvent) -> Result<HostedEvent, GatewayError> {
        let context = self.chain(chain)?;
        let hosted = hosting::create_event(&context, self.store.as_ref(), input).await?;

        let _ = self.event_bus.publish(TicketingEvent::MetadataPinned {
            cid: hosted.metadata_cid.to_string(),
            timestamp: Utc::now(),
        });
        let _ = self.event_bus.publish(TicketingEvent::EventCreated {
            chain: context.config.key.clone(),
            event_id: hosted.event_id,
            organizer: hosted.organizer.to_string(),
            name: input.name.trim().to_string(),
            metadata_cid: hosted.metadata_cid.to_string(),
            transaction_hash: hosted.transaction.to_string(),
            timestamp: Utc::now(),
        });
        Ok(hosted)
    }

    /// Pins a metadata document and publishes
    /// [`TicketingEvent::MetadataPinned`].
    ///
    /// # Errors
    ///
    /// Returns the metadata store failure.
    pub async fn pin_metadata(&self, record: &MetadataRecord) -> Result<ContentAddress, GatewayError> {
        let address = metadata::upload_json(self.store.as_ref(), record).await?;
        let _ = self.event_bus.publish(TicketingEvent::MetadataPinned {
            cid: address.to_string(),
            timestamp: Utc::now(),
        });
        Ok(address)
    }

    /// Fetches the metadata document behind `cid`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank address,
    /// [`GatewayError::MetadataNotFound`] or the store failure.
    pub async fn fetch_metadata(&self, cid: &str) -> Result<MetadataRecord, GatewayError> {
        let address = ContentAddress::parse(cid)
            .ok_or_else(|| GatewayError::InvalidRequest(format!("invalid content address {cid:?}")))?;
        Ok(metadata::fetch_json(self.store.as_ref(), &address).await?)
    }

    /// Gateway URL for `uri`, if it can be resolved.
    #[must_use]
    pub fn resolve_url(&self, uri: &str) -> Option<String> {
        self.store.gateway().resolve_url(uri)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::chain::testing::{FakeChain, SeedEvent};
    use crate::metadata::{InMemoryStore, IpfsGateway};

    fn service(fake: &Arc<FakeChain>) -> TicketingService {
        let mut registry = ChainRegistry::new();
        registry.insert_shared(fake.context());
        let store = InMemoryStore::new(IpfsGateway::new("https://gw/ipfs", "metadata.json"));
        TicketingService::new(Arc::new(registry), Arc::new(store), EventBus::new(16), "placeholder")
    }

    #[tokio::test]
    async fn purchase_publishes_event() {
        let fake = Arc::new(FakeChain::new());
        fake.add_event(SeedEvent::new(1, "bafy"));
        let service = service(&fake);
        let mut rx = service.event_bus().subscribe("test");

        let result = service.purchase("polygon", EventId::new(1), 2, None).await;
        assert!(result.is_ok());

        let Some(TicketingEvent::TicketsPurchased { quantity, token_ids, .. }) = rx.recv().await else {
            panic!("expected TicketsPurchased");
        };
        assert_eq!(quantity, 2);
        assert_eq!(token_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn unknown_chain_is_not_found() {
        let fake = Arc::new(FakeChain::new());
        let service = service(&fake);
        let result = service.list_events("base", &EventQuery::default()).await;
        assert!(matches!(result, Err(GatewayError::ChainNotFound(_))));
    }

    #[tokio::test]
    async fn hosting_publishes_pin_and_creation() {
        let fake = Arc::new(FakeChain::new());
        let service = service(&fake);
        let mut rx = service.event_bus().subscribe("test");

        let input = NewEvent {
            name: "Launch".to_string(),
            description: None,
            date: Utc::now() + chrono::Duration::days(1),
            price: "1".to_string(),
            total_tickets: 10,
            image: None,
            attributes: Vec::new(),
        };
        let Ok(hosted) = service.create_event("polygon", &input).await else {
            panic!("hosting should succeed");
        };

        let first = rx.recv().await.map(|e| e.event_type_str());
        let second = rx.recv().await.map(|e| e.event_type_str());
        assert_eq!(first, Some("metadata_pinned"));
        assert_eq!(second, Some("event_created"));

        let Ok(events) = service.list_events("polygon", &EventQuery::default()).await else {
            panic!("listing should succeed");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().map(|e| e.id), Some(hosted.event_id));
        assert_eq!(
            events.first().and_then(|e| e.metadata.name.clone()).as_deref(),
            Some("Launch")
        );
    }

    #[tokio::test]
    async fn blank_cid_is_invalid() {
        let fake = Arc::new(FakeChain::new());
        let result = service(&fake).fetch_metadata(" ").await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }
}
