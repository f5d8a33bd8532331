//! Domain events emitted after successful writes.
//!
//! Every confirmed transaction or pin publishes a [`TicketingEvent`]
//! through the [`super::EventBus`]. Events are broadcast to WebSocket
//! subscribers and optionally appended to the PostgreSQL audit log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::EventId;

/// Domain event emitted after a confirmed state change.
///
/// Wei amounts and hashes are strings so they survive JSON intact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TicketingEvent {
    /// A `createEvent` transaction was mined and its log decoded.
    EventCreated {
        /// Chain key.
        chain: String,
        /// New event identifier.
        event_id: EventId,
        /// Organizer address.
        organizer: String,
        /// On-chain name.
        name: String,
        /// Metadata content address.
        metadata_cid: String,
        /// Transaction hash.
        transaction_hash: String,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Tickets were paid for and minted.
    TicketsPurchased {
        /// Chain key.
        chain: String,
        /// Event the tickets belong to.
        event_id: EventId,
        /// Recipient address.
        buyer: String,
        /// Number of tickets minted.
        quantity: u64,
        /// Minted token ids.
        token_ids: Vec<u64>,
        /// Amount paid in wei (decimal string).
        total_paid_wei: String,
        /// Hashes of every transaction sent.
        transaction_hashes: Vec<String>,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A document was pinned to the metadata store.
    MetadataPinned {
        /// Content address.
        cid: String,
        /// Pin timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TicketingEvent {
    /// Chain the event happened on, if any.
    #[must_use]
    pub fn chain(&self) -> Option<&str> {
        match self {
            Self::EventCreated { chain, .. } | Self::TicketsPurchased { chain, .. } => Some(chain),
            Self::MetadataPinned { .. } => None,
        }
    }

    /// Ticketed event concerned, if any.
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        match self {
            Self::EventCreated { event_id, .. } | Self::TicketsPurchased { event_id, .. } => {
                Some(*event_id)
            }
            Self::MetadataPinned { .. } => None,
        }
    }

    /// Subscription topic `"<chain>:<event id>"`, if the event has one.
    #[must_use]
    pub fn topic(&self) -> Option<String> {
        Some(format!("{}:{}", self.chain()?, self.event_id()?))
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "event_created",
            Self::TicketsPurchased { .. } => "tickets_purchased",
            Self::MetadataPinned { .. } => "metadata_pinned",
        }
    }
}
