//! Ticket handlers: per-owner listing and single ticket.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::parse_address;
use crate::api::dto::{TicketDto, TicketListResponse};
use crate::app_state::AppState;
use crate::domain::TicketId;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /chains/{chain}/accounts/{address}/tickets`: Tickets minted to
/// an address.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a malformed address.
#[utoipa::path(
    get,
    path = "/api/v1/chains/{chain}/accounts/{address}/tickets",
    tag = "Tickets",
    summary = "List an account's tickets",
    description = "Reconstructs the tickets minted to the address from TicketMinted logs, joined with their token metadata.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        ("address" = String, Path, description = "Owner address (0x-prefixed hex)"),
    ),
    responses(
        (status = 200, description = "Owned tickets", body = TicketListResponse),
        (status = 400, description = "Malformed address", body = ErrorResponse),
        (status = 404, description = "Chain not configured", body = ErrorResponse),
    )
)]
pub async fn account_tickets(
    State(state): State<AppState>,
    Path((chain, address)): Path<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let owner = parse_address("address", &address)?;
    let tickets = state.ticketing_service.tickets_of(&chain, owner).await?;
    Ok(Json(TicketListResponse {
        owner: owner.to_string(),
        data: tickets.into_iter().map(TicketDto::from).collect(),
    }))
}

/// `GET /chains/{chain}/tickets/{id}`: One ticket.
///
/// # Errors
///
/// Returns [`GatewayError::TicketNotFound`] if the token was never minted.
#[utoipa::path(
    get,
    path = "/api/v1/chains/{chain}/tickets/{id}",
    tag = "Tickets",
    summary = "Get ticket",
    description = "Returns a ticket with its current owner and token metadata.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        ("id" = u64, Path, description = "Token id"),
    ),
    responses(
        (status = 200, description = "Ticket details", body = TicketDto),
        (status = 404, description = "Chain or ticket not found", body = ErrorResponse),
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path((chain, id)): Path<(String, u64)>,
) -> Result<impl IntoResponse, GatewayError> {
    let ticket = state
        .ticketing_service
        .get_ticket(&chain, TicketId::new(id))
        .await?;
    Ok(Json(TicketDto::from(ticket)))
}

/// Ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chains/{chain}/accounts/{address}/tickets", get(account_tickets))
        .route("/chains/{chain}/tickets/{id}", get(get_ticket))
}
