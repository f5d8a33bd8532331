//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Chain and metadata-store errors are folded in through `From`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::chain::ChainError;
use crate::domain::{EventId, TicketId};
use crate::metadata::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "only 0 tickets remaining for event 3, requested 1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request / 409 Conflict |
/// | 2000–2999 | Not Found         | 404 Not Found                |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | On-chain revert   | 422 Unprocessable Entity     |
/// | 5000–5999 | Upstream          | 502 Bad Gateway              |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Not enough tickets left for the requested quantity.
    #[error("only {remaining} tickets remaining for event {event_id}, requested {requested}")]
    InsufficientTickets {
        /// Event asked for.
        event_id: EventId,
        /// Requested quantity.
        requested: u64,
        /// Tickets left.
        remaining: u64,
    },

    /// Chain key is not configured.
    #[error("chain not configured: {0}")]
    ChainNotFound(String),

    /// No `EventCreated` log for the identifier.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// No `TicketMinted` log for the token.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// No document at the content address.
    #[error("metadata not found: {0}")]
    MetadataNotFound(String),

    /// Node unreachable or returned unusable data.
    #[error("chain rpc error: {0}")]
    Rpc(String),

    /// Metadata store unreachable or failing.
    #[error("metadata store error: {0}")]
    MetadataStore(String),

    /// A call or transaction reverted.
    #[error("transaction reverted: {reason}")]
    Reverted {
        /// Decoded revert reason.
        reason: String,
        /// Hash of the mined transaction, if it reached the chain.
        transaction: Option<String>,
    },

    /// `createEvent` was mined but emitted no `EventCreated` log.
    #[error("event creation {transaction} mined without an EventCreated log")]
    EventNotConfirmed {
        /// Transaction hash.
        transaction: String,
    },

    /// Purchase transactions were mined but no `TicketMinted` log was
    /// found.
    #[error("purchase {transaction} mined without a TicketMinted log")]
    MintNotConfirmed {
        /// Hash of the last transaction.
        transaction: String,
    },

    /// Payment succeeded but minting failed (legacy two-step flow).
    #[error("payment {payment_tx} succeeded but minting failed after {} ticket(s): {reason}", minted.len())]
    PaymentWithoutMint {
        /// Hash of the payment transaction.
        payment_tx: String,
        /// Token ids minted before the failure.
        minted: Vec<u64>,
        /// Why the failing mint did not go through.
        reason: String,
    },

    /// Transaction still unmined after polling.
    #[error("transaction {0} not mined in time")]
    ReceiptTimeout(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InsufficientTickets { .. } => 1002,
            Self::ChainNotFound(_) => 2001,
            Self::EventNotFound(_) => 2002,
            Self::TicketNotFound(_) => 2003,
            Self::MetadataNotFound(_) => 2004,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::PaymentWithoutMint { .. } => 3002,
            Self::Reverted { .. } => 4001,
            Self::Rpc(_) => 5001,
            Self::MetadataStore(_) => 5002,
            Self::EventNotConfirmed { .. } => 5003,
            Self::MintNotConfirmed { .. } => 5004,
            Self::ReceiptTimeout(_) => 5005,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientTickets { .. } => StatusCode::CONFLICT,
            Self::ChainNotFound(_)
            | Self::EventNotFound(_)
            | Self::TicketNotFound(_)
            | Self::MetadataNotFound(_) => StatusCode::NOT_FOUND,
            Self::Reverted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Rpc(_)
            | Self::MetadataStore(_)
            | Self::EventNotConfirmed { .. }
            | Self::MintNotConfirmed { .. }
            | Self::ReceiptTimeout(_) => StatusCode::BAD_GATEWAY,
            Self::PaymentWithoutMint { .. } | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable details for reconciliation, if any.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::PaymentWithoutMint {
                payment_tx, minted, ..
            } => Some(json!({ "payment_tx": payment_tx, "minted": minted }).to_string()),
            Self::Reverted {
                transaction: Some(tx),
                ..
            } => Some(json!({ "transaction": tx }).to_string()),
            _ => None,
        }
    }
}

impl From<ChainError> for GatewayError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Reverted {
                reason,
                transaction,
            } => Self::Reverted {
                reason,
                transaction: transaction.map(|tx| tx.to_string()),
            },
            ChainError::ReceiptTimeout(hash) => Self::ReceiptTimeout(hash.to_string()),
            other @ (ChainError::Rpc(_)
            | ChainError::NoSigner
            | ChainError::Abi { .. }
            | ChainError::InconsistentState(_)) => Self::Rpc(other.to_string()),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(address) => Self::MetadataNotFound(address),
            StoreError::Config(message) => Self::Internal(message),
            other => Self::MetadataStore(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
