//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams confirmed writes to clients
//! subscribed by topic and answers read-only event and quote commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
