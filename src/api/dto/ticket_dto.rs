//! Ticket DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Ticket;

/// A minted ticket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketDto {
    /// Token id.
    pub id: u64,
    /// Chain key.
    pub chain: String,
    /// Current owner.
    pub owner: String,
    /// Event the ticket admits to.
    pub event_id: u64,
    /// Raw token URI.
    pub token_uri: String,
    /// Gateway URL of the token metadata, if resolvable.
    pub metadata_url: Option<String>,
    /// Browser-loadable image URL.
    pub image_url: String,
    /// Token metadata document.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl From<Ticket> for TicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id.get(),
            chain: ticket.chain,
            owner: ticket.owner.to_string(),
            event_id: ticket.event_id.get(),
            token_uri: ticket.token_uri,
            metadata_url: ticket.metadata_url,
            image_url: ticket.image_url,
            metadata: serde_json::to_value(&ticket.metadata).unwrap_or_default(),
        }
    }
}

/// Response body for `GET /chains/{chain}/accounts/{address}/tickets`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketListResponse {
    /// Owner queried.
    pub owner: String,
    /// Tickets ordered by token id.
    pub data: Vec<TicketDto>,
}
