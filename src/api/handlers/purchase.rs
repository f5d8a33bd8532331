//! Quote and purchase handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::parse_address;
use crate::api::dto::{PurchaseRequest, PurchaseResponse, QuoteRequest, QuoteResponse};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /chains/{chain}/events/{id}/quote`: Price a purchase.
///
/// # Errors
///
/// Returns [`GatewayError::InsufficientTickets`] when the quantity exceeds
/// the remaining inventory.
#[utoipa::path(
    post,
    path = "/api/v1/chains/{chain}/events/{id}/quote",
    tag = "Purchases",
    summary = "Quote a purchase",
    description = "Reads the current price and inventory and returns the aggregate wei amount. Sends no transaction.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        ("id" = u64, Path, description = "On-chain event identifier"),
    ),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Purchase quote", body = QuoteResponse),
        (status = 400, description = "Invalid quantity", body = ErrorResponse),
        (status = 404, description = "Chain or event not found", body = ErrorResponse),
        (status = 409, description = "Not enough tickets", body = ErrorResponse),
    )
)]
pub async fn quote(
    State(state): State<AppState>,
    Path((chain, id)): Path<(String, u64)>,
    Json(req): Json<QuoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let quote = state
        .ticketing_service
        .quote(&chain, EventId::new(id), req.quantity)
        .await?;
    Ok(Json(QuoteResponse::from(quote)))
}

/// `POST /chains/{chain}/events/{id}/purchase`: Buy tickets.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input, insufficient inventory,
/// revert, or unconfirmed mints.
#[utoipa::path(
    post,
    path = "/api/v1/chains/{chain}/events/{id}/purchase",
    tag = "Purchases",
    summary = "Purchase tickets",
    description = "Pays the aggregate price and mints one NFT per ticket. Atomic chains use a single purchaseTickets call; two-step chains pay then mint and report payment_tx plus minted ids on partial failure.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        ("id" = u64, Path, description = "On-chain event identifier"),
    ),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Tickets minted", body = PurchaseResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Chain or event not found", body = ErrorResponse),
        (status = 409, description = "Not enough tickets", body = ErrorResponse),
        (status = 422, description = "Transaction reverted", body = ErrorResponse),
        (status = 500, description = "Payment taken but minting failed", body = ErrorResponse),
        (status = 502, description = "Upstream failure or unconfirmed mint", body = ErrorResponse),
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Path((chain, id)): Path<(String, u64)>,
    Json(req): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let buyer = req
        .buyer
        .as_deref()
        .map(|raw| parse_address("buyer", raw))
        .transpose()?;

    let receipt = state
        .ticketing_service
        .purchase(&chain, EventId::new(id), req.quantity, buyer)
        .await?;
    Ok(Json(PurchaseResponse::from(receipt)))
}

/// Purchase routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chains/{chain}/events/{id}/quote", post(quote))
        .route("/chains/{chain}/events/{id}/purchase", post(purchase))
}
