//! Persistence layer: PostgreSQL audit log of ticketing events.
//!
//! Chain state is always reconstructed from logs; the database only
//! records what the gateway confirmed. [`spawn_audit_logger`] appends
//! every [`crate::domain::TicketingEvent`] published on the bus using
//! `sqlx::PgPool`.

pub mod models;
pub mod postgres;

pub use models::{NewStoredEvent, StoredEvent};
pub use postgres::{PostgresPersistence, spawn_audit_logger};
