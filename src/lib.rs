//! # ticketchain-gateway
//!
//! REST API and WebSocket gateway for NFT event ticketing on EVM chains.
//!
//! Event and ticket state is never stored: it is reconstructed on demand
//! from the `EventCreated` and `TicketMinted` logs of the EventFactory and
//! TicketNFT contracts, joined with JSON metadata held in a
//! content-addressed store (IPFS via Pinata). Purchases and event hosting
//! are sent as transactions from the node's signing account.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── TicketingService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── ChainRegistry → JSON-RPC node per chain (chain/)
//!     ├── MetadataStore → Pinata / in-memory (metadata/)
//!     │
//!     └── PostgreSQL audit log (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod metadata;
pub mod persistence;
pub mod service;
pub mod ws;
