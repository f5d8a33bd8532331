//! Service layer: business logic orchestration.
//!
//! [`TicketingService`] resolves the chain for each request, delegates to
//! the reconstruction, purchase and hosting flows, and emits events
//! through the [`super::domain::EventBus`].

pub mod hosting;
pub mod purchase;
pub mod reconstructor;
pub mod ticketing_service;

pub use hosting::{HostedEvent, NewEvent};
pub use purchase::{PurchaseQuote, PurchaseReceipt};
pub use reconstructor::Reconstructor;
pub use ticketing_service::TicketingService;
