//! Content-addressed metadata store client.
//!
//! [`MetadataStore`] is the seam between the gateway and the pinning
//! service. [`PinataStore`] talks to Pinata's HTTP API; [`InMemoryStore`]
//! keeps documents in process for local development and tests.

pub mod address;
pub mod memory;
pub mod pinata;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

pub use address::{ContentAddress, IpfsGateway};
pub use memory::InMemoryStore;
pub use pinata::PinataStore;

use crate::config::{MetadataBackend, MetadataConfig};
use crate::domain::MetadataRecord;

/// JSON content type.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Errors raised by metadata store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("metadata store unreachable: {0}")]
    Transport(String),

    /// The store answered with an unexpected HTTP status.
    #[error("metadata store returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// No document at the requested address.
    #[error("no document at {0}")]
    NotFound(String),

    /// The document or the store's response is not the expected JSON.
    #[error("malformed metadata: {0}")]
    Decode(String),

    /// The store is not usable with the current configuration.
    #[error("metadata store misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Upload and retrieval of pinned documents.
///
/// Uploads are wrapped in a folder so the returned address names the
/// folder and the file is reachable as `<address>/<filename>`.
pub trait MetadataStore: Send + Sync + fmt::Debug {
    /// Pins `bytes` as `<folder>/<filename>` and returns the folder
    /// address.
    fn upload_bytes<'a>(
        &'a self,
        bytes: Vec<u8>,
        filename: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<ContentAddress, StoreError>>;

    /// Raw bytes of the file at `address` (which must carry a path).
    fn fetch_bytes<'a>(
        &'a self,
        address: &'a ContentAddress,
    ) -> BoxFuture<'a, Result<Vec<u8>, StoreError>>;

    /// Gateway used to turn addresses into URLs.
    fn gateway(&self) -> &IpfsGateway;
}

/// Pins `record` as the default metadata document.
///
/// # Errors
///
/// Returns [`StoreError`] if serialization or the upload fails.
pub async fn upload_json(
    store: &dyn MetadataStore,
    record: &MetadataRecord,
) -> Result<ContentAddress, StoreError> {
    let body = serde_json::to_vec(record).map_err(|e| StoreError::Decode(e.to_string()))?;
    let filename = store.gateway().default_filename().to_string();
    store
        .upload_bytes(body, &filename, JSON_CONTENT_TYPE)
        .await
}

/// Fetches the metadata document behind `address`.
///
/// Folder addresses resolve to the default document; addresses that
/// already carry a path are fetched as-is.
///
/// # Errors
///
/// Returns [`StoreError`] if the fetch fails or the document is not a
/// metadata object.
pub async fn fetch_json(
    store: &dyn MetadataStore,
    address: &ContentAddress,
) -> Result<MetadataRecord, StoreError> {
    let document = address.document(store.gateway().default_filename());
    let bytes = store.fetch_bytes(&document).await?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Builds the configured store.
///
/// # Errors
///
/// Returns [`StoreError::Config`] if Pinata is selected without a JWT, or
/// [`StoreError::Transport`] if the HTTP client cannot be built.
pub fn build_store(
    config: &MetadataConfig,
    timeout: Duration,
) -> Result<Arc<dyn MetadataStore>, StoreError> {
    let gateway = IpfsGateway::new(&config.gateway_url, &config.filename);
    match config.backend {
        MetadataBackend::Memory => Ok(Arc::new(InMemoryStore::new(gateway))),
        MetadataBackend::Pinata => {
            let jwt = config
                .pinata_jwt
                .as_deref()
                .filter(|jwt| !jwt.trim().is_empty())
                .ok_or_else(|| StoreError::Config("PINATA_JWT is not set".to_string()))?;
            let store = PinataStore::new(&config.pinata_api_url, jwt, gateway, timeout)?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn memory_config() -> MetadataConfig {
        MetadataConfig {
            backend: MetadataBackend::Memory,
            pinata_api_url: "https://api.pinata.cloud".to_string(),
            pinata_jwt: None,
            gateway_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            filename: "metadata.json".to_string(),
            placeholder_image_url: "https://placehold.co/400x300?text=No+Image".to_string(),
        }
    }

    #[test]
    fn pinata_requires_jwt() {
        let config = MetadataConfig {
            backend: MetadataBackend::Pinata,
            ..memory_config()
        };
        let result = build_store(&config, Duration::from_secs(1));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn upload_then_fetch_yields_equivalent_record() {
        let Ok(store) = build_store(&memory_config(), Duration::from_secs(1)) else {
            panic!("memory store should build");
        };
        let record = MetadataRecord {
            name: Some("Rust Meetup".to_string()),
            date: Some("2030-01-01T18:00:00Z".to_string()),
            ..MetadataRecord::default()
        };
        let Ok(address) = upload_json(store.as_ref(), &record).await else {
            panic!("upload should succeed");
        };
        assert!(address.path().is_none());

        let fetched = fetch_json(store.as_ref(), &address).await;
        assert_eq!(fetched.ok(), Some(record));
    }

    #[tokio::test]
    async fn non_object_document_is_decode_error() {
        let store = InMemoryStore::new(IpfsGateway::new("https://gw", "metadata.json"));
        let Ok(address) = store
            .upload_bytes(b"[1,2]".to_vec(), "metadata.json", JSON_CONTENT_TYPE)
            .await
        else {
            panic!("upload should succeed");
        };
        let result = fetch_json(&store, &address).await;
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
