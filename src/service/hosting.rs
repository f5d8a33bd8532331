//! Event hosting: pin metadata, then `createEvent`.
//!
//! The call is encoded for the newest enabled [`EventSchema`]. A first
//! generation factory stores neither price nor image, so events hosted
//! there report a zero price, as the reconstructor does for them.

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::chain::schema::decode_created;
use crate::chain::{ChainContext, CreateEventArgs, EventSchema};
use crate::domain::{EventId, MetadataAttribute, MetadataRecord, parse_ether_amount};
use crate::error::GatewayError;
use crate::metadata::{self, ContentAddress, MetadataStore};

/// Organizer input for a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Scheduled time; must be in the future.
    pub date: DateTime<Utc>,
    /// Ticket price as a decimal ether string.
    pub price: String,
    /// Ticket supply.
    pub total_tickets: u64,
    /// Image as an `ipfs://` URI, bare content address or URL.
    pub image: Option<String>,
    /// Extra metadata traits.
    pub attributes: Vec<MetadataAttribute>,
}

/// A confirmed `createEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedEvent {
    /// Identifier assigned by EventFactory.
    pub event_id: EventId,
    /// Organizer (the signing account).
    pub organizer: Address,
    /// Pinned metadata folder.
    pub metadata_cid: ContentAddress,
    /// Price per ticket in wei as recorded on-chain.
    pub price: U256,
    /// Contract generation the event was created with.
    pub schema: EventSchema,
    /// Transaction hash.
    pub transaction: B256,
}

/// Validates `input` at time `now` and returns the price in wei.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming the first offending
/// field.
pub fn validate(input: &NewEvent, now: DateTime<Utc>) -> Result<U256, GatewayError> {
    if input.name.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("name must not be empty".to_string()));
    }
    if input.date <= now {
        return Err(GatewayError::InvalidRequest(format!(
            "date {} is not in the future",
            input.date.to_rfc3339_opts(SecondsFormat::Secs, true)
        )));
    }
    if input.total_tickets == 0 {
        return Err(GatewayError::InvalidRequest(
            "total_tickets must be greater than 0".to_string(),
        ));
    }
    let price =
        parse_ether_amount(&input.price).map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    if price.is_zero() {
        return Err(GatewayError::InvalidRequest(
            "price must be greater than 0".to_string(),
        ));
    }
    Ok(price)
}

/// Document pinned for `input`.
#[must_use]
pub fn metadata_record(input: &NewEvent) -> MetadataRecord {
    MetadataRecord {
        name: Some(input.name.trim().to_string()),
        description: input.description.clone().filter(|d| !d.trim().is_empty()),
        image: input.image.clone().filter(|i| !i.trim().is_empty()),
        date: Some(input.date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        attributes: input.attributes.clone(),
        ..MetadataRecord::default()
    }
}

/// Validates, pins the metadata and sends `createEvent`.
///
/// # Errors
///
/// Validation errors are raised before any network call, as is
/// [`GatewayError::Internal`] when the chain enables no schema. After that:
/// metadata store errors, [`GatewayError::Reverted`],
/// [`GatewayError::ReceiptTimeout`], or [`GatewayError::EventNotConfirmed`]
/// when the receipt carries no `EventCreated` log.
pub async fn create_event(
    chain: &ChainContext,
    store: &dyn MetadataStore,
    input: &NewEvent,
) -> Result<HostedEvent, GatewayError> {
    let price = validate(input, Utc::now())?;
    let schema = EventSchema::newest(&chain.config.event_schemas).ok_or_else(|| {
        GatewayError::Internal(format!("chain {} enables no event schema", chain.key()))
    })?;
    let date = u64::try_from(input.date.timestamp())
        .map_err(|_| GatewayError::InvalidRequest("date before 1970".to_string()))?;

    let metadata_cid = metadata::upload_json(store, &metadata_record(input)).await?;
    let image_cid = input
        .image
        .as_deref()
        .filter(|i| !i.trim().starts_with("http"))
        .and_then(ContentAddress::parse)
        .map(|a| a.to_string())
        .unwrap_or_default();

    let args = CreateEventArgs {
        name: input.name.trim().to_string(),
        date,
        metadata_cid: metadata_cid.to_string(),
        image_cid,
        price,
        max_tickets: input.total_tickets,
    };

    let organizer = chain.client.signer_address().await?;
    if schema == EventSchema::V1 {
        tracing::warn!(chain = %chain.key(), price = %args.price, "v1 factory does not record price or image");
    }
    tracing::info!(chain = %chain.key(), name = %args.name, %metadata_cid, %schema, "creating event");
    let receipt = chain.factory.create_event(organizer, &args, schema).await?;

    let created = receipt
        .logs_from(chain.factory.address())
        .find_map(|log| decode_created(log, &chain.config.event_schemas).ok())
        .ok_or_else(|| GatewayError::EventNotConfirmed {
            transaction: receipt.transaction_hash.to_string(),
        })?;

    tracing::info!(chain = %chain.key(), event_id = %created.event_id, tx = %receipt.transaction_hash, "event created");
    Ok(HostedEvent {
        event_id: created.event_id,
        organizer: created.organizer,
        metadata_cid,
        price: match schema {
            EventSchema::V1 => U256::ZERO,
            EventSchema::V2 => price,
        },
        schema,
        transaction: receipt.transaction_hash,
    })
}
