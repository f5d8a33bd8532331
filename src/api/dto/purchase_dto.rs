//! Quote and purchase DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::PurchaseMode;
use crate::domain::format_ether_amount;
use crate::service::{PurchaseQuote, PurchaseReceipt};

/// Request body for `POST /chains/{chain}/events/{id}/quote`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuoteRequest {
    /// Number of tickets.
    pub quantity: u64,
}

/// Request body for `POST /chains/{chain}/events/{id}/purchase`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Number of tickets.
    pub quantity: u64,
    /// Ticket recipient. Defaults to the node's signing account.
    #[serde(default)]
    pub buyer: Option<String>,
}

/// Response body for the quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    /// Event quoted.
    pub event_id: u64,
    /// Number of tickets.
    pub quantity: u64,
    /// Price per ticket in wei (decimal string).
    pub price_per_ticket_wei: String,
    /// Aggregate price in wei (decimal string).
    pub total_wei: String,
    /// Aggregate price in ether (decimal string).
    pub total: String,
    /// Tickets left at quote time.
    pub remaining: u64,
}

impl From<PurchaseQuote> for QuoteResponse {
    fn from(quote: PurchaseQuote) -> Self {
        Self {
            event_id: quote.event_id.get(),
            quantity: quote.quantity,
            price_per_ticket_wei: quote.price_per_ticket.to_string(),
            total_wei: quote.total.to_string(),
            total: format_ether_amount(quote.total),
            remaining: quote.remaining,
        }
    }
}

/// Response body for the purchase endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    /// Event the tickets belong to.
    pub event_id: u64,
    /// Ticket recipient.
    pub buyer: String,
    /// Minted token ids.
    pub token_ids: Vec<u64>,
    /// Amount paid in wei (decimal string).
    pub total_paid_wei: String,
    /// Amount paid in ether (decimal string).
    pub total_paid: String,
    /// Hashes of every transaction sent, in order.
    pub transactions: Vec<String>,
    /// Purchase flow used.
    pub mode: PurchaseMode,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            event_id: receipt.event_id.get(),
            buyer: receipt.buyer.to_string(),
            token_ids: receipt.token_ids.iter().map(|t| t.get()).collect(),
            total_paid_wei: receipt.total_paid.to_string(),
            total_paid: format_ether_amount(receipt.total_paid),
            transactions: receipt.transactions.iter().map(ToString::to_string).collect(),
            mode: receipt.mode,
        }
    }
}
