//! Versioned `EventCreated` log schemas.
//!
//! Each contract generation emits its own `EventCreated` shape and exposes
//! its own state getter. An [`EventSchema`] pairs the two so that the
//! reconstructor can query every enabled generation at once and decode
//! each log with the schema selected by its topic 0.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::ChainError;
use super::contracts::EventFactory;
use super::types::Log;
use crate::domain::EventId;

/// First-generation log: `EventCreated(uint256,address,string)`.
#[allow(missing_docs)]
pub mod v1 {
    alloy_sol_types::sol! {
        event EventCreated(uint256 indexed eventId, address indexed organizer, string ipfsCID);
    }
}

/// Second-generation log carrying image, price and supply.
#[allow(missing_docs)]
pub mod v2 {
    alloy_sol_types::sol! {
        event EventCreated(
            uint256 indexed eventId,
            address indexed organizer,
            string ipfsCID,
            string imageCID,
            uint256 price,
            uint256 totalTickets
        );
    }
}

/// Why a log could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Topic 0 is absent or not the signature of any enabled schema.
    #[error("log topic does not match any enabled EventCreated schema")]
    UnknownTopic,
    /// The log matched a signature but its payload did not decode.
    #[error("{schema} EventCreated log does not decode: {message}")]
    Abi {
        /// Schema the log was decoded with.
        schema: EventSchema,
        /// Decoder error.
        message: String,
    },
    /// A numeric field does not fit the gateway's integer types.
    #[error("{field} out of range")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
    },
}

/// Contract generation of the `EventCreated` log and its state getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSchema {
    /// `EventCreated(uint256,address,string)` + `events(uint256)`.
    V1,
    /// `EventCreated(uint256,address,string,string,uint256,uint256)` +
    /// `getEventDetails(uint256)`.
    V2,
}

/// Fields carried by an `EventCreated` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEventLog {
    /// Schema the log was decoded with.
    pub schema: EventSchema,
    /// Event identifier.
    pub event_id: EventId,
    /// Creator of the event.
    pub organizer: Address,
    /// Metadata content address.
    pub metadata_cid: String,
    /// Image content address (v2 only).
    pub image_cid: Option<String>,
}

/// Point-in-time state of an event read from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    /// On-chain name.
    pub name: String,
    /// Scheduled time.
    pub date: DateTime<Utc>,
    /// Price per ticket in wei.
    pub price: U256,
    /// Ticket supply.
    pub total_tickets: u64,
    /// Tickets still available.
    pub remaining: u64,
    /// Metadata content address.
    pub metadata_cid: String,
    /// Image content address, if recorded on-chain.
    pub image_cid: Option<String>,
    /// Creator of the event.
    pub organizer: Address,
}

impl EventSchema {
    /// Every known schema, oldest first.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Solidity signature of the schema's `EventCreated`.
    #[must_use]
    pub const fn signature(self) -> &'static str {
        match self {
            Self::V1 => v1::EventCreated::SIGNATURE,
            Self::V2 => v2::EventCreated::SIGNATURE,
        }
    }

    /// Topic 0 of the schema's `EventCreated`.
    #[must_use]
    pub const fn signature_hash(self) -> B256 {
        match self {
            Self::V1 => v1::EventCreated::SIGNATURE_HASH,
            Self::V2 => v2::EventCreated::SIGNATURE_HASH,
        }
    }

    /// Latest generation in `enabled`, the one new events are created with.
    #[must_use]
    pub fn newest(enabled: &[Self]) -> Option<Self> {
        enabled.iter().copied().max()
    }

    /// Selects the enabled schema whose signature hash is `topic`.
    #[must_use]
    pub fn for_topic(topic: &B256, enabled: &[Self]) -> Option<Self> {
        enabled
            .iter()
            .copied()
            .find(|schema| schema.signature_hash() == *topic)
    }

    /// Decodes `log` with this schema.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the log does not match the schema.
    pub fn decode(self, log: &Log) -> Result<CreatedEventLog, DecodeError> {
        let topics = log.topics.iter().copied();
        let abi = |e: alloy_sol_types::Error| DecodeError::Abi {
            schema: self,
            message: e.to_string(),
        };
        match self {
            Self::V1 => {
                let event = v1::EventCreated::decode_raw_log(topics, &log.data).map_err(abi)?;
                Ok(CreatedEventLog {
                    schema: self,
                    event_id: event_id(event.eventId)?,
                    organizer: event.organizer,
                    metadata_cid: event.ipfsCID,
                    image_cid: None,
                })
            }
            Self::V2 => {
                let event = v2::EventCreated::decode_raw_log(topics, &log.data).map_err(abi)?;
                Ok(CreatedEventLog {
                    schema: self,
                    event_id: event_id(event.eventId)?,
                    organizer: event.organizer,
                    metadata_cid: event.ipfsCID,
                    image_cid: non_empty(event.imageCID),
                })
            }
        }
    }

    /// Reads the current state of `id` with this schema's getter.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the read fails, or
    /// [`ChainError::InconsistentState`] if the returned values break the
    /// `remaining <= total` invariant or do not fit.
    pub async fn read_state(
        self,
        factory: &EventFactory,
        id: EventId,
    ) -> Result<EventState, ChainError> {
        match self {
            Self::V1 => {
                let ev = factory.legacy_event(id).await?;
                let total = state_u64(ev.maxTickets, "maxTickets")?;
                let sold = state_u64(ev.ticketsSold, "ticketsSold")?;
                let remaining = total.checked_sub(sold).ok_or_else(|| {
                    ChainError::InconsistentState(format!(
                        "event {id}: {sold} sold out of {total}"
                    ))
                })?;
                Ok(EventState {
                    name: ev.name,
                    date: state_date(ev.date)?,
                    price: U256::ZERO,
                    total_tickets: total,
                    remaining,
                    metadata_cid: ev.ipfsCID,
                    image_cid: None,
                    organizer: ev.organizer,
                })
            }
            Self::V2 => {
                let ev = factory.event_details(id).await?;
                let total = state_u64(ev.totalTickets, "totalTickets")?;
                let remaining = state_u64(ev.remaining, "remaining")?;
                if remaining > total {
                    return Err(ChainError::InconsistentState(format!(
                        "event {id}: {remaining} remaining out of {total}"
                    )));
                }
                Ok(EventState {
                    name: ev.name,
                    date: state_date(ev.date)?,
                    price: ev.price,
                    total_tickets: total,
                    remaining,
                    metadata_cid: ev.ipfsCID,
                    image_cid: non_empty(ev.imageCID),
                    organizer: ev.organizer,
                })
            }
        }
    }
}

/// Decodes an `EventCreated` log with whichever enabled schema its topic 0
/// selects.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownTopic`] if no enabled schema matches, or
/// the schema's decode error.
pub fn decode_created(log: &Log, enabled: &[EventSchema]) -> Result<CreatedEventLog, DecodeError> {
    let topic = log.topics.first().ok_or(DecodeError::UnknownTopic)?;
    let schema = EventSchema::for_topic(topic, enabled).ok_or(DecodeError::UnknownTopic)?;
    schema.decode(log)
}

fn event_id(raw: U256) -> Result<EventId, DecodeError> {
    EventId::try_from(raw).map_err(|_| DecodeError::OutOfRange { field: "eventId" })
}

fn non_empty(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

fn state_u64(raw: U256, field: &str) -> Result<u64, ChainError> {
    u64::try_from(raw)
        .map_err(|_| ChainError::InconsistentState(format!("{field} does not fit in u64")))
}

fn state_date(raw: U256) -> Result<DateTime<Utc>, ChainError> {
    i64::try_from(raw)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ChainError::InconsistentState(format!("date {raw} is not a timestamp")))
}

impl fmt::Display for EventSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

impl FromStr for EventSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(format!("unknown event schema: {other}")),
        }
    }
}
