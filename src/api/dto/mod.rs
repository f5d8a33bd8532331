//! Data Transfer Objects for REST request/response serialization.
//!
//! All wei amounts are serialized as decimal JSON strings to prevent
//! precision loss on 256-bit values.

pub mod common_dto;
pub mod event_dto;
pub mod metadata_dto;
pub mod purchase_dto;
pub mod ticket_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use metadata_dto::*;
pub use purchase_dto::*;
pub use ticket_dto::*;
