//! Metadata pinning DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for `POST /metadata` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PinMetadataResponse {
    /// Content address of the pinned folder.
    pub cid: String,
    /// `ipfs://` URI of the folder.
    pub uri: String,
    /// Gateway URL of the pinned document.
    pub gateway_url: String,
}
