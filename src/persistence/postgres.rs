//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinHandle;

use super::models::{NewStoredEvent, StoredEvent};
use crate::config::GatewayConfig;
use crate::domain::{BusReceiver, EventId, TicketingEvent};
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the database settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if no connection can be
    /// established.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    /// Appends an event to the audit log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &TicketingEvent) -> Result<i64, GatewayError> {
        let row = NewStoredEvent::from_event(event)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO ticketing_events (event_type, chain, event_id, payload) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(row.event_type)
        .bind(row.chain)
        .bind(row.event_id)
        .bind(row.payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(id)
    }

    /// Loads the audit trail of one ticketed event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_events_for(
        &self,
        chain: &str,
        event_id: EventId,
    ) -> Result<Vec<StoredEvent>, GatewayError> {
        let event_id = i64::try_from(event_id.get())
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let rows = sqlx::query_as::<
            _,
            (i64, String, Option<String>, Option<i64>, serde_json::Value, DateTime<Utc>),
        >(
            "SELECT id, event_type, chain, event_id, payload, created_at FROM ticketing_events \
             WHERE chain = $1 AND event_id = $2 ORDER BY created_at ASC, id ASC",
        )
        .bind(chain)
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, event_type, chain, event_id, payload, created_at)| StoredEvent {
                    id,
                    event_type,
                    chain,
                    event_id,
                    payload,
                    created_at,
                },
            )
            .collect())
    }
}

/// Spawns a task appending every event from `event_rx` to the audit log.
///
/// Write failures are logged and skipped; the task ends when the bus
/// closes.
pub fn spawn_audit_logger(
    persistence: PostgresPersistence,
    mut event_rx: BusReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Err(e) = persistence.save_event(&event).await {
                tracing::warn!(
                    event_type = event.event_type_str(),
                    error = %e,
                    "failed to persist ticketing event"
                );
            }
        }
        tracing::debug!(missed = event_rx.missed(), "audit logger stopped");
    })
}
