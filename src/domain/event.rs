//! Reconstructed ticketed events and minted tickets.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};

use super::{EventId, MetadataRecord, TicketId};
use crate::chain::EventSchema;

/// An event as observed on-chain, joined with its metadata.
///
/// Identity (`id`, `organizer`, `metadata_cid`) comes from the
/// `EventCreated` log; the mutable fields are the contract's state at the
/// time of reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketedEvent {
    /// EventFactory identifier.
    pub id: EventId,
    /// Configuration key of the chain.
    pub chain: String,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// On-chain name.
    pub name: String,
    /// Scheduled time.
    pub date: DateTime<Utc>,
    /// Price per ticket in wei.
    pub price: U256,
    /// Ticket supply.
    pub total_tickets: u64,
    /// Tickets still available; never exceeds `total_tickets`.
    pub remaining: u64,
    /// Creator.
    pub organizer: Address,
    /// Metadata content address.
    pub metadata_cid: String,
    /// Image content address recorded on-chain.
    pub image_cid: Option<String>,
    /// Resolved image URL (placeholder if none could be resolved).
    pub image_url: String,
    /// Joined metadata; empty when the fetch failed.
    pub metadata: MetadataRecord,
    /// Log schema the event was decoded with.
    pub schema: EventSchema,
}

impl TicketedEvent {
    /// Returns `true` when no ticket is left.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.remaining == 0
    }

    /// Returns `true` if `quantity` tickets can be bought right now.
    #[must_use]
    pub const fn can_purchase(&self, quantity: u64) -> bool {
        quantity >= 1 && quantity <= self.remaining
    }

    /// Tickets sold so far.
    #[must_use]
    pub const fn tickets_sold(&self) -> u64 {
        self.total_tickets.saturating_sub(self.remaining)
    }

    /// Returns `true` if the event starts after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }

    /// On-chain name, falling back to the metadata name and then the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        let on_chain = self.name.trim();
        if !on_chain.is_empty() {
            return on_chain.to_string();
        }
        match self.metadata.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Event #{}", self.id),
        }
    }
}

/// A minted ticket joined with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    /// TicketNFT token id.
    pub id: TicketId,
    /// Configuration key of the chain.
    pub chain: String,
    /// Owner (the mint recipient, or the current `ownerOf` when read).
    pub owner: Address,
    /// Event the ticket was minted for.
    pub event_id: EventId,
    /// Raw `tokenURI`.
    pub token_uri: String,
    /// Gateway URL of the metadata document, when the URI is
    /// content-addressed.
    pub metadata_url: Option<String>,
    /// Joined metadata; empty when the fetch failed.
    pub metadata: MetadataRecord,
    /// Resolved image URL (placeholder if none could be resolved).
    pub image_url: String,
}
