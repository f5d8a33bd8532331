//! Metadata handlers: pin and fetch documents.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::PinMetadataResponse;
use crate::app_state::AppState;
use crate::domain::MetadataRecord;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /metadata`: Pin a metadata document.
///
/// # Errors
///
/// Returns [`GatewayError::MetadataStore`] if the pinning service fails.
#[utoipa::path(
    post,
    path = "/api/v1/metadata",
    tag = "Metadata",
    summary = "Pin metadata",
    description = "Uploads a JSON metadata document and returns its content address.",
    request_body(content = Object, description = "Metadata document (name, description, image, date, attributes, any extra fields)"),
    responses(
        (status = 201, description = "Document pinned", body = PinMetadataResponse),
        (status = 502, description = "Pinning service failure", body = ErrorResponse),
    )
)]
pub async fn pin_metadata(
    State(state): State<AppState>,
    Json(record): Json<MetadataRecord>,
) -> Result<impl IntoResponse, GatewayError> {
    let address = state.ticketing_service.pin_metadata(&record).await?;
    let gateway_url = state.ticketing_service.store().gateway().document_url(&address);
    Ok((
        StatusCode::CREATED,
        Json(PinMetadataResponse {
            cid: address.to_string(),
            uri: address.to_uri(),
            gateway_url,
        }),
    ))
}

/// `GET /metadata/{cid}`: Fetch a metadata document.
///
/// # Errors
///
/// Returns [`GatewayError::MetadataNotFound`] if nothing is stored there.
#[utoipa::path(
    get,
    path = "/api/v1/metadata/{cid}",
    tag = "Metadata",
    summary = "Fetch metadata",
    description = "Fetches the JSON document behind a content address. A bare folder address resolves to its default document.",
    params(
        ("cid" = String, Path, description = "Content address, optionally followed by a path"),
    ),
    responses(
        (status = 200, description = "Metadata document", body = Object),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 502, description = "Gateway failure", body = ErrorResponse),
    )
)]
pub async fn fetch_metadata(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state.ticketing_service.fetch_metadata(&cid).await?;
    Ok(Json(record))
}

/// Metadata routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metadata", post(pin_metadata))
        .route("/metadata/{*cid}", get(fetch_metadata))
}
