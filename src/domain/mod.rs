//! Domain layer: identifiers, reconstructed records and the event system.
//!
//! This module contains the server-side domain model: on-chain
//! identifiers, ticketed events and tickets joined with their metadata,
//! wei pricing helpers, marketplace filters, and the event bus for
//! broadcasting confirmed writes.

pub mod event;
pub mod event_bus;
pub mod ids;
pub mod metadata;
pub mod pricing;
pub mod query;
pub mod ticketing_event;

pub use event::{Ticket, TicketedEvent};
pub use event_bus::{BusReceiver, EventBus};
pub use ids::{EventId, IdOutOfRange, TicketId};
pub use metadata::{MetadataAttribute, MetadataRecord};
pub use pricing::{PriceError, aggregate_price, format_ether_amount, parse_ether_amount};
pub use query::{DateWindow, EventQuery, PriceFilter};
pub use ticketing_event::TicketingEvent;
