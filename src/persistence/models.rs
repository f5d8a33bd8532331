//! Database models for the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TicketingEvent;

/// A stored row from the `ticketing_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Event type discriminator (e.g. `"tickets_purchased"`).
    pub event_type: String,
    /// Chain key, for chain-scoped events.
    pub chain: Option<String>,
    /// Ticketed event identifier, for event-scoped events.
    pub event_id: Option<i64>,
    /// JSONB payload with the serialized [`TicketingEvent`].
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Column values for inserting one [`TicketingEvent`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewStoredEvent {
    /// Event type discriminator.
    pub event_type: &'static str,
    /// Chain key.
    pub chain: Option<String>,
    /// Ticketed event identifier.
    pub event_id: Option<i64>,
    /// Serialized event.
    pub payload: serde_json::Value,
}

impl NewStoredEvent {
    /// Row for `event`.
    ///
    /// # Errors
    ///
    /// Returns the serialization error, if any.
    pub fn from_event(event: &TicketingEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event.event_type_str(),
            chain: event.chain().map(str::to_string),
            event_id: event
                .event_id()
                .and_then(|id| i64::try_from(id.get()).ok()),
            payload: serde_json::to_value(event)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventId;

    #[test]
    fn row_carries_topic_columns() {
        let event = TicketingEvent::EventCreated {
            chain: "amoy".to_string(),
            event_id: EventId::new(12),
            organizer: "0xabc".to_string(),
            name: "Meetup".to_string(),
            metadata_cid: "bafy".to_string(),
            transaction_hash: "0x01".to_string(),
            timestamp: Utc::now(),
        };
        let Ok(row) = NewStoredEvent::from_event(&event) else {
            panic!("event should serialize");
        };
        assert_eq!(row.event_type, "event_created");
        assert_eq!(row.chain.as_deref(), Some("amoy"));
        assert_eq!(row.event_id, Some(12));
        assert_eq!(
            row.payload.get("name").and_then(|v| v.as_str()),
            Some("Meetup")
        );

        let pinned = TicketingEvent::MetadataPinned {
            cid: "bafy".to_string(),
            timestamp: Utc::now(),
        };
        let Ok(row) = NewStoredEvent::from_event(&pinned) else {
            panic!("event should serialize");
        };
        assert_eq!(row.chain, None);
        assert_eq!(row.event_id, None);
    }
}
