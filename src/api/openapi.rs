//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{events, metadata, purchase, system, tickets};
use crate::error::{ErrorBody, ErrorResponse};

/// Aggregated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ticketchain-gateway",
        description = "Reconstructs event ticketing state from EVM contract logs and drives NFT ticket purchases."
    ),
    paths(
        system::health_handler,
        system::chains_handler,
        events::list_events,
        events::get_event,
        events::create_event,
        purchase::quote,
        purchase::purchase,
        tickets::account_tickets,
        tickets::get_ticket,
        metadata::pin_metadata,
        metadata::fetch_metadata,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Events", description = "Event reconstruction and hosting"),
        (name = "Purchases", description = "Quotes and ticket purchases"),
        (name = "Tickets", description = "Minted ticket lookup"),
        (name = "Metadata", description = "Content-addressed metadata documents"),
    )
)]
pub struct ApiDoc;
