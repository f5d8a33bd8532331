//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe("ws");
    let service = Arc::clone(&state.ticketing_service);

    ws.on_upgrade(move |socket| run_connection(socket, event_rx, service))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use tokio_tungstenite::tungstenite::Message as ClientMessage;

    use super::*;
    use crate::api::build_app;
    use crate::chain::ChainRegistry;
    use crate::chain::testing::{FakeChain, SeedEvent};
    use crate::domain::{EventBus, EventId};
    use crate::metadata::{InMemoryStore, IpfsGateway};
    use crate::service::TicketingService;

    async fn next_json<S>(ws: &mut S) -> Value
    where
        S: StreamExt<Item = Result<ClientMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
        let Ok(Some(Ok(msg))) = next else {
            panic!("expected a websocket message");
        };
        let Ok(text) = msg.to_text() else {
            panic!("expected a text frame");
        };
        serde_json::from_str(text).unwrap_or(Value::Null)
    }

    #[tokio::test]
    async fn subscribed_client_receives_purchase_events() {
        let fake = Arc::new(FakeChain::new());
        fake.add_event(SeedEvent::new(4, "bafy"));
        let mut registry = ChainRegistry::new();
        registry.insert_shared(fake.context());
        let store = InMemoryStore::new(IpfsGateway::new("https://gw/ipfs", "metadata.json"));
        let service = Arc::new(TicketingService::new(
            Arc::new(registry),
            Arc::new(store),
            EventBus::new(16),
            "placeholder",
        ));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let app = build_app(AppState::new(Arc::clone(&service)));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
        else {
            panic!("websocket handshake failed");
        };

        let subscribe = json!({
            "id": "sub-1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": { "command": "subscribe", "topics": ["polygon:4"] },
        });
        let sent = ws.send(ClientMessage::text(subscribe.to_string())).await;
        assert!(sent.is_ok());

        let reply = next_json(&mut ws).await;
        assert_eq!(reply.get("id").and_then(Value::as_str), Some("sub-1"));
        assert_eq!(reply.get("type").and_then(Value::as_str), Some("response"));

        let purchase = service.purchase("polygon", EventId::new(4), 1, None).await;
        assert!(purchase.is_ok());

        let event = next_json(&mut ws).await;
        assert_eq!(event.get("type").and_then(Value::as_str), Some("event"));
        assert_eq!(
            event.pointer("/payload/event_type").and_then(Value::as_str),
            Some("tickets_purchased")
        );
        assert_eq!(event.pointer("/payload/event_id").and_then(Value::as_u64), Some(4));
    }
}
