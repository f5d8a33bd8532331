//! Event handlers: list, get, host.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateEventRequest, CreateEventResponse, EventDto, EventFilterParams, EventListResponse,
    PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::NewEvent;

/// `GET /chains/{chain}/events`: Reconstructed events.
///
/// # Errors
///
/// Returns [`GatewayError::ChainNotFound`] or an upstream failure.
#[utoipa::path(
    get,
    path = "/api/v1/chains/{chain}/events",
    tag = "Events",
    summary = "List events",
    description = "Rebuilds the event list from EventCreated logs, joins each record with its metadata, applies the marketplace filters and paginates. Records that fail to decode are skipped.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        EventFilterParams,
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
        (status = 404, description = "Chain not configured", body = ErrorResponse),
        (status = 502, description = "Node unreachable", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Path(chain): Path<String>,
    Query(filter): Query<EventFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let events = state
        .ticketing_service
        .list_events(&chain, &filter.to_query())
        .await?;

    let (page, meta) = pagination.paginate(events);
    Ok(Json(EventListResponse {
        data: page.into_iter().map(EventDto::from).collect(),
        pagination: meta,
    }))
}

/// `GET /chains/{chain}/events/{id}`: One event.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if no creation log exists.
#[utoipa::path(
    get,
    path = "/api/v1/chains/{chain}/events/{id}",
    tag = "Events",
    summary = "Get event",
    description = "Reconstructs a single event from its creation log and current contract state.",
    params(
        ("chain" = String, Path, description = "Chain key"),
        ("id" = u64, Path, description = "On-chain event identifier"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDto),
        (status = 404, description = "Chain or event not found", body = ErrorResponse),
        (status = 502, description = "Node unreachable", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path((chain, id)): Path<(String, u64)>,
) -> Result<impl IntoResponse, GatewayError> {
    let event = state
        .ticketing_service
        .get_event(&chain, EventId::new(id))
        .await?;
    Ok(Json(EventDto::from(event)))
}

/// `POST /chains/{chain}/events`: Host a new event.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] before any network call when
/// the input is invalid.
#[utoipa::path(
    post,
    path = "/api/v1/chains/{chain}/events",
    tag = "Events",
    summary = "Host an event",
    description = "Pins the event metadata, sends createEvent from the node's signing account and returns the identifier read from the EventCreated log.",
    params(
        ("chain" = String, Path, description = "Chain key"),
    ),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreateEventResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Chain not configured", body = ErrorResponse),
        (status = 422, description = "Transaction reverted", body = ErrorResponse),
        (status = 502, description = "Upstream failure or missing EventCreated log", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Path(chain): Path<String>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let input = NewEvent::from(req);
    let hosted = state.ticketing_service.create_event(&chain, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse::new(&chain, hosted)),
    ))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chains/{chain}/events", get(list_events).post(create_event))
        .route("/chains/{chain}/events/{id}", get(get_event))
}
