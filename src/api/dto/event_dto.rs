//! Event DTOs for listing, detail and hosting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{
    DateWindow, EventQuery, MetadataAttribute, PriceFilter, TicketedEvent, format_ether_amount,
};
use crate::service::{HostedEvent, NewEvent};

/// Marketplace filters for `GET /chains/{chain}/events`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventFilterParams {
    /// Only events whose date is after now. Defaults to `true`.
    #[serde(default)]
    pub upcoming: Option<bool>,
    /// Date window: `all`, `today`, `week` or `month`.
    #[serde(default)]
    #[param(inline)]
    pub date: Option<DateWindow>,
    /// Price filter: `all`, `free` or `paid`.
    #[serde(default)]
    #[param(inline)]
    pub price: Option<PriceFilter>,
}

impl EventFilterParams {
    /// Domain query with defaults filled in.
    #[must_use]
    pub fn to_query(&self) -> EventQuery {
        let defaults = EventQuery::default();
        EventQuery {
            upcoming_only: self.upcoming.unwrap_or(defaults.upcoming_only),
            date: self.date.unwrap_or(defaults.date),
            price: self.price.unwrap_or(defaults.price),
        }
    }
}

/// A reconstructed event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    /// On-chain event identifier.
    pub id: u64,
    /// Chain key.
    pub chain: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Display name (on-chain name, then metadata name).
    pub name: String,
    /// Scheduled time.
    pub date: DateTime<Utc>,
    /// Price per ticket in wei (decimal string).
    pub price_wei: String,
    /// Price per ticket in ether (decimal string).
    pub price: String,
    /// Ticket supply.
    pub total_tickets: u64,
    /// Tickets left.
    pub remaining: u64,
    /// Tickets already sold.
    pub tickets_sold: u64,
    /// `true` once `remaining` reaches zero.
    pub sold_out: bool,
    /// Organizer address.
    pub organizer: String,
    /// Metadata content address.
    pub metadata_cid: String,
    /// Image content address, when recorded on-chain.
    pub image_cid: Option<String>,
    /// Browser-loadable image URL (placeholder on metadata failure).
    pub image_url: String,
    /// Log schema the event was decoded with.
    pub schema: String,
    /// Off-chain metadata document (empty object on fetch failure).
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl From<TicketedEvent> for EventDto {
    fn from(event: TicketedEvent) -> Self {
        let name = event.display_name();
        Self {
            id: event.id.get(),
            chain_id: event.chain_id,
            name,
            date: event.date,
            price_wei: event.price.to_string(),
            price: format_ether_amount(event.price),
            total_tickets: event.total_tickets,
            remaining: event.remaining,
            tickets_sold: event.tickets_sold(),
            sold_out: event.is_sold_out(),
            organizer: event.organizer.to_string(),
            image_cid: event.image_cid,
            image_url: event.image_url,
            schema: event.schema.to_string(),
            metadata: serde_json::to_value(&event.metadata).unwrap_or_default(),
            metadata_cid: event.metadata_cid,
            chain: event.chain,
        }
    }
}

/// Response body for `GET /chains/{chain}/events`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page, sorted by date.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// One `{ "trait_type", "value" }` metadata attribute.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttributeDto {
    /// Attribute name.
    pub trait_type: String,
    /// Attribute value.
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

/// Request body for `POST /chains/{chain}/events`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled time (ISO-8601); must be in the future.
    pub date: DateTime<Utc>,
    /// Price per ticket in ether (decimal string, e.g. `"0.05"`).
    pub price: String,
    /// Ticket supply.
    pub total_tickets: u64,
    /// Image as an `ipfs://` URI, bare content address or URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Extra metadata traits.
    #[serde(default)]
    pub attributes: Vec<AttributeDto>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            date: req.date,
            price: req.price,
            total_tickets: req.total_tickets,
            image: req.image,
            attributes: req
                .attributes
                .into_iter()
                .map(|a| MetadataAttribute {
                    trait_type: a.trait_type,
                    value: a.value,
                })
                .collect(),
        }
    }
}

/// Response body for `POST /chains/{chain}/events` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEventResponse {
    /// Identifier assigned by the factory contract.
    pub event_id: u64,
    /// Chain key.
    pub chain: String,
    /// Organizer (signing account).
    pub organizer: String,
    /// Pinned metadata content address.
    pub metadata_cid: String,
    /// Price per ticket in wei (decimal string). Always `0` on a `v1`
    /// factory, which does not record prices.
    pub price_wei: String,
    /// Contract generation used (`v1` or `v2`).
    pub schema: String,
    /// `createEvent` transaction hash.
    pub transaction_hash: String,
}

impl CreateEventResponse {
    /// Builds the response for a confirmed hosting on `chain`.
    #[must_use]
    pub fn new(chain: &str, hosted: HostedEvent) -> Self {
        Self {
            event_id: hosted.event_id.get(),
            chain: chain.to_string(),
            organizer: hosted.organizer.to_string(),
            metadata_cid: hosted.metadata_cid.to_string(),
            price_wei: hosted.price.to_string(),
            schema: hosted.schema.to_string(),
            transaction_hash: hosted.transaction.to_string(),
        }
    }
}
