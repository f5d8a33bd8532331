//! ticketchain-gateway server entry point.
//!
//! Loads configuration, connects to every configured chain and the
//! metadata store, then starts the Axum HTTP server with REST and
//! WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ticketchain_gateway::api;
use ticketchain_gateway::app_state::AppState;
use ticketchain_gateway::chain::{ChainRegistry, RpcError};
use ticketchain_gateway::config::GatewayConfig;
use ticketchain_gateway::domain::EventBus;
use ticketchain_gateway::metadata::build_store;
use ticketchain_gateway::persistence::{PostgresPersistence, spawn_audit_logger};
use ticketchain_gateway::service::TicketingService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = GatewayConfig::from_env().context("invalid configuration")?;
    tracing::info!(addr = %config.listen_addr, chains = config.chains.len(), "starting ticketchain-gateway");

    // Connect chains
    let registry = ChainRegistry::connect(&config.chains, config.http_timeout, config.receipt_polling)
        .context("failed to build chain clients")?;
    for chain in registry.iter() {
        match chain.verify_chain_id().await {
            Ok(()) => tracing::info!(chain = %chain.key(), chain_id = chain.config.chain_id, "chain connected"),
            Err(e @ RpcError::ChainIdMismatch { .. }) => {
                anyhow::bail!("chain {} misconfigured: {e}", chain.key());
            }
            Err(e) => tracing::warn!(chain = %chain.key(), error = %e, "node unreachable at startup"),
        }
    }

    // Metadata store
    let store = build_store(&config.metadata, config.http_timeout)
        .context("failed to build metadata store")?;

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let service = Arc::new(TicketingService::new(
        Arc::new(registry),
        store,
        event_bus.clone(),
        config.metadata.placeholder_image_url.clone(),
    ));

    // Optional audit log
    if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        persistence.migrate().await.context("failed to run migrations")?;
        spawn_audit_logger(persistence, event_bus.subscribe("audit"));
        tracing::info!("audit log enabled");
    }

    // Build router
    let app = api::build_app(AppState::new(service));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
