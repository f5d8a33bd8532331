//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::TicketingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ticketing service for all business logic.
    pub ticketing_service: Arc<TicketingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// State sharing the service's event bus.
    #[must_use]
    pub fn new(ticketing_service: Arc<TicketingService>) -> Self {
        let event_bus = ticketing_service.event_bus().clone();
        Self {
            ticketing_service,
            event_bus,
        }
    }
}
