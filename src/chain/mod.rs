//! EVM chain access: JSON-RPC transport, contract ABIs and log schemas.
//!
//! ```text
//! ChainRegistry ─► ChainContext ─┬─► EventFactory ─┐
//!                                └─► TicketNft ────┴─► ChainClient ─► dyn ChainRpc (AlloyRpc)
//! ```

pub mod client;
pub mod contracts;
pub mod provider;
pub mod registry;
pub mod revert;
pub mod rpc;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ChainClient, ChainError, ReceiptPolling};
pub use contracts::{CreateEventArgs, EventFactory, MintedTicket, TicketNft};
pub use provider::AlloyRpc;
pub use registry::{ChainContext, ChainRegistry};
pub use rpc::{ChainRpc, RpcError};
pub use schema::{CreatedEventLog, DecodeError, EventSchema, EventState};
pub use types::{BlockTag, Log, LogFilter, TransactionReceipt, TransactionRequest};
