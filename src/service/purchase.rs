//! Ticket purchase flow.
//!
//! Inventory and price are validated against the contract's current state
//! before anything is sent. Atomic chains pay and mint in one
//! `purchaseTickets` transaction; legacy chains pay with `buyTicket` and
//! then mint one ticket at a time.

use alloy_primitives::{Address, B256, U256};

use super::reconstructor::locate_event;
use crate::chain::{ChainContext, EventState, MintedTicket, TransactionReceipt};
use crate::config::PurchaseMode;
use crate::domain::{EventId, TicketId, aggregate_price};
use crate::error::GatewayError;

/// Price of a prospective purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseQuote {
    /// Event to buy from.
    pub event_id: EventId,
    /// Tickets requested.
    pub quantity: u64,
    /// Wei per ticket.
    pub price_per_ticket: U256,
    /// `price_per_ticket × quantity` in wei.
    pub total: U256,
    /// Tickets left before the purchase.
    pub remaining: u64,
}

/// Outcome of a confirmed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// Event bought from.
    pub event_id: EventId,
    /// Ticket recipient.
    pub buyer: Address,
    /// Minted token ids, in confirmation order.
    pub token_ids: Vec<TicketId>,
    /// Wei paid.
    pub total_paid: U256,
    /// Every transaction sent, payment first.
    pub transactions: Vec<B256>,
    /// Flow used.
    pub mode: PurchaseMode,
}

/// Checks `quantity` against `state` and prices it.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a zero quantity or an
/// overflowing total, and [`GatewayError::InsufficientTickets`] when the
/// inventory is short.
pub fn price_purchase(
    event_id: EventId,
    state: &EventState,
    quantity: u64,
) -> Result<PurchaseQuote, GatewayError> {
    if quantity == 0 {
        return Err(GatewayError::InvalidRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    if quantity > state.remaining {
        return Err(GatewayError::InsufficientTickets {
            event_id,
            requested: quantity,
            remaining: state.remaining,
        });
    }
    let total = aggregate_price(state.price, quantity).ok_or_else(|| {
        GatewayError::InvalidRequest(format!(
            "total price overflows for {quantity} tickets at {} wei",
            state.price
        ))
    })?;
    Ok(PurchaseQuote {
        event_id,
        quantity,
        price_per_ticket: state.price,
        total,
        remaining: state.remaining,
    })
}

/// Quotes `quantity` tickets of `event_id` at the current on-chain state.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`], the validation errors of
/// [`price_purchase`], or the chain error raised by the state read.
pub async fn quote(
    chain: &ChainContext,
    event_id: EventId,
    quantity: u64,
) -> Result<PurchaseQuote, GatewayError> {
    let log = locate_event(chain, event_id).await?;
    let state = log.schema.read_state(&chain.factory, event_id).await?;
    price_purchase(event_id, &state, quantity)
}

/// Buys `quantity` tickets of `event_id` for `buyer` (the signer when
/// `None`) and waits for every transaction to be mined.
///
/// # Errors
///
/// Validation errors are raised before any transaction is sent. After
/// that: [`GatewayError::Reverted`], [`GatewayError::ReceiptTimeout`],
/// [`GatewayError::MintNotConfirmed`] when an atomic purchase emits no
/// `TicketMinted` log, and [`GatewayError::PaymentWithoutMint`] when a
/// legacy mint fails or goes unconfirmed after the payment was mined.
pub async fn purchase(
    chain: &ChainContext,
    event_id: EventId,
    quantity: u64,
    buyer: Option<Address>,
) -> Result<PurchaseReceipt, GatewayError> {
    let log = locate_event(chain, event_id).await?;
    let state = log.schema.read_state(&chain.factory, event_id).await?;
    let quote = price_purchase(event_id, &state, quantity)?;

    let signer = chain.client.signer_address().await?;
    let buyer = buyer.unwrap_or(signer);
    let mode = chain.config.purchase_mode;

    tracing::info!(
        chain = %chain.key(),
        %event_id,
        quantity,
        %buyer,
        %mode,
        total_wei = %quote.total,
        "purchasing tickets"
    );

    let (token_ids, transactions) = match mode {
        PurchaseMode::Atomic => {
            if buyer != signer {
                return Err(GatewayError::InvalidRequest(format!(
                    "atomic purchases mint to the signing account {signer}"
                )));
            }
            let receipt = chain
                .factory
                .purchase_tickets(signer, event_id, quantity, quote.total)
                .await?;
            let minted = confirmed(chain, &receipt, event_id);
            (minted, vec![receipt.transaction_hash])
        }
        PurchaseMode::TwoStep => {
            two_step(chain, signer, buyer, event_id, &quote, &state.metadata_cid).await?
        }
    };

    if token_ids.is_empty() {
        let transaction = transactions.last().copied().unwrap_or_default();
        return Err(GatewayError::MintNotConfirmed {
            transaction: transaction.to_string(),
        });
    }
    if token_ids.len() as u64 != quantity {
        tracing::warn!(
            %event_id,
            requested = quantity,
            confirmed = token_ids.len(),
            "fewer mints confirmed than requested"
        );
    }

    Ok(PurchaseReceipt {
        event_id,
        buyer,
        token_ids,
        total_paid: quote.total,
        transactions,
        mode,
    })
}

async fn two_step(
    chain: &ChainContext,
    signer: Address,
    buyer: Address,
    event_id: EventId,
    quote: &PurchaseQuote,
    token_uri: &str,
) -> Result<(Vec<TicketId>, Vec<B256>), GatewayError> {
    let payment = chain
        .factory
        .buy_ticket(signer, event_id, quote.quantity, quote.total)
        .await?;
    let payment_tx = payment.transaction_hash;
    let mut transactions = vec![payment_tx];
    let mut minted: Vec<TicketId> = Vec::new();

    for _ in 0..quote.quantity {
        match chain
            .tickets
            .mint_ticket(signer, buyer, event_id, token_uri)
            .await
        {
            Ok(receipt) => {
                transactions.push(receipt.transaction_hash);
                minted.extend(confirmed(chain, &receipt, event_id));
            }
            Err(e) => {
                tracing::error!(
                    %event_id,
                    payment_tx = %payment_tx,
                    minted = minted.len(),
                    error = %e,
                    "mint failed after payment"
                );
                return Err(payment_without_mint(payment_tx, &minted, e.to_string()));
            }
        }
    }

    let confirmed = minted.len() as u64;
    if confirmed < quote.quantity {
        tracing::error!(
            %event_id,
            payment_tx = %payment_tx,
            requested = quote.quantity,
            confirmed,
            "mints mined without TicketMinted logs"
        );
        return Err(payment_without_mint(
            payment_tx,
            &minted,
            format!(
                "{} of {} mints emitted no TicketMinted log",
                quote.quantity - confirmed,
                quote.quantity
            ),
        ));
    }
    Ok((minted, transactions))
}

fn payment_without_mint(payment_tx: B256, minted: &[TicketId], reason: String) -> GatewayError {
    GatewayError::PaymentWithoutMint {
        payment_tx: payment_tx.to_string(),
        minted: minted.iter().map(|id| id.get()).collect(),
        reason,
    }
}

/// Token ids of `TicketMinted` logs for `event_id` in `receipt`.
fn confirmed(chain: &ChainContext, receipt: &TransactionReceipt, event_id: EventId) -> Vec<TicketId> {
    chain
        .tickets
        .minted_in(receipt)
        .into_iter()
        .filter(|m: &MintedTicket| m.event_id == event_id)
        .map(|m| m.token_id)
        .collect()
}
