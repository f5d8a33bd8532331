//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{SubscriptionManager, Topic};
use crate::api::dto::{EventDto, QuoteResponse};
use crate::domain::{BusReceiver, EventId};
use crate::service::TicketingService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`BusReceiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: BusReceiver,
    service: Arc<TicketingService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                let Some(ticketing_event) = event else {
                    break;
                };
                if subs.matches(&ticketing_event) {
                    let msg = WsMessage::new(
                        uuid::Uuid::new_v4().to_string(),
                        WsMessageType::Event,
                        serde_json::to_value(&ticketing_event).unwrap_or_default(),
                    );
                    let json = serde_json::to_string(&msg).unwrap_or_default();
                    if ws_tx.send(Message::text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!(missed = event_rx.missed(), "ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    service: &TicketingService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { topics } => match parse_topics(&topics) {
            Ok(parsed) => {
                subs.subscribe(&parsed);
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "subscribed": parsed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "count": subs.count(),
                        "wildcard": subs.is_subscribed_all(),
                    }),
                )
            }
            Err(e) => WsMessage::error(msg.id, 400, e),
        },
        WsCommand::Unsubscribe { topics } => match parse_topics(&topics) {
            Ok(parsed) => {
                subs.unsubscribe(&parsed);
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "unsubscribed": parsed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "remaining_count": subs.count(),
                    }),
                )
            }
            Err(e) => WsMessage::error(msg.id, 400, e),
        },
        WsCommand::GetEvent { chain, event_id } => {
            match service.get_event(&chain, EventId::new(event_id)).await {
                Ok(event) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(EventDto::from(event)).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
            }
        }
        WsCommand::Quote {
            chain,
            event_id,
            quantity,
        } => match service.quote(&chain, EventId::new(event_id), quantity).await {
            Ok(quote) => WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::to_value(QuoteResponse::from(quote)).unwrap_or_default(),
            ),
            Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
        },
    };
    serde_json::to_string(&response).ok()
}

fn parse_topics(raw: &[String]) -> Result<Vec<Topic>, String> {
    raw.iter()
        .map(|t| t.parse::<Topic>().map_err(|e| e.to_string()))
        .collect()
}
