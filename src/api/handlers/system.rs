//! System endpoints: health check and configured chains.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::config::PurchaseMode;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// A configured chain and its contract addresses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChainInfo {
    /// Key used in request paths.
    pub key: String,
    /// Display name.
    pub name: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// EventFactory address.
    pub event_factory: String,
    /// TicketNFT address.
    pub ticket_nft: String,
    /// Purchase flow.
    pub purchase_mode: PurchaseMode,
    /// Enabled `EventCreated` log schemas.
    pub event_schemas: Vec<String>,
    /// Native currency symbol.
    pub native_symbol: String,
}

/// `GET /config/chains`: List configured chains.
#[utoipa::path(
    get,
    path = "/config/chains",
    tag = "System",
    summary = "List configured chains",
    description = "Returns every chain the gateway serves, with contract addresses and purchase mode.",
    responses(
        (status = 200, description = "Chain catalog", body = Vec<ChainInfo>),
    )
)]
pub async fn chains_handler(State(state): State<AppState>) -> impl IntoResponse {
    let chains: Vec<ChainInfo> = state
        .ticketing_service
        .chains()
        .iter()
        .map(|chain| ChainInfo {
            key: chain.config.key.clone(),
            name: chain.config.name.clone(),
            chain_id: chain.config.chain_id,
            event_factory: chain.config.event_factory.to_string(),
            ticket_nft: chain.config.ticket_nft.to_string(),
            purchase_mode: chain.config.purchase_mode,
            event_schemas: chain
                .config
                .event_schemas
                .iter()
                .map(ToString::to_string)
                .collect(),
            native_symbol: chain.config.native_symbol.clone(),
        })
        .collect();
    (StatusCode::OK, Json(chains))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/chains", get(chains_handler))
}
