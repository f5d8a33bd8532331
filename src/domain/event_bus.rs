//! Fan-out of confirmed ticketing writes.
//!
//! Services publish a [`TicketingEvent`] once its transaction or pin is
//! confirmed. Each consumer (a WebSocket connection, the audit logger)
//! holds a named [`BusReceiver`] that skips past whatever it fell behind
//! on and keeps a tally of it.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, SendError};

use super::TicketingEvent;

/// Broadcast bus for [`TicketingEvent`]s.
///
/// Backed by a `tokio::broadcast` ring buffer (default capacity 10 000).
/// A consumer slower than the buffer loses the oldest events, never the
/// newest.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TicketingEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per consumer.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event` and returns how many consumers it reached.
    ///
    /// With no consumer attached the event is dropped.
    pub fn publish(&self, event: TicketingEvent) -> usize {
        match self.sender.send(event) {
            Ok(reached) => {
                tracing::trace!(reached, "ticketing event published");
                reached
            }
            Err(SendError(event)) => {
                tracing::debug!(
                    event_type = event.event_type_str(),
                    chain = event.chain().unwrap_or("-"),
                    "no consumer for ticketing event"
                );
                0
            }
        }
    }

    /// Attaches a consumer that sees every event published from now on.
    /// `consumer` labels its lag warnings.
    #[must_use]
    pub fn subscribe(&self, consumer: &'static str) -> BusReceiver {
        BusReceiver {
            consumer,
            rx: self.sender.subscribe(),
            missed: 0,
        }
    }

    /// Number of attached consumers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One consumer's view of the [`EventBus`].
#[derive(Debug)]
pub struct BusReceiver {
    consumer: &'static str,
    rx: broadcast::Receiver<TicketingEvent>,
    missed: u64,
}

impl BusReceiver {
    /// Next event, or `None` once the bus is gone.
    ///
    /// A lagging consumer resumes at the oldest event still buffered.
    /// Cancel safe, so it can sit in a `tokio::select!` arm.
    pub async fn recv(&mut self) -> Option<TicketingEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    self.missed = self.missed.saturating_add(skipped);
                    tracing::warn!(
                        consumer = self.consumer,
                        skipped,
                        missed = self.missed,
                        "consumer lagged behind event bus"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Events skipped so far because this consumer lagged.
    #[must_use]
    pub const fn missed(&self) -> u64 {
        self.missed
    }

    /// Label given at subscription.
    #[must_use]
    pub const fn consumer(&self) -> &'static str {
        self.consumer
    }
}
