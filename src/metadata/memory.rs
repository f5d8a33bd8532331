//! In-process metadata store.
//!
//! Folder addresses are the hex `keccak256` of the filename and content,
//! so identical uploads share an address just like on IPFS.

use std::collections::HashMap;

use alloy_primitives::{hex, keccak256};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use super::{ContentAddress, IpfsGateway, MetadataStore, StoreError};

/// Documents kept in a `RwLock<HashMap>` keyed by `<cid>/<filename>`.
#[derive(Debug)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
    gateway: IpfsGateway,
}

impl InMemoryStore {
    /// Creates an empty store that renders URLs through `gateway`.
    #[must_use]
    pub fn new(gateway: IpfsGateway) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            gateway,
        }
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns `true` if nothing has been uploaded.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl MetadataStore for InMemoryStore {
    fn upload_bytes<'a>(
        &'a self,
        bytes: Vec<u8>,
        filename: &'a str,
        _content_type: &'a str,
    ) -> BoxFuture<'a, Result<ContentAddress, StoreError>> {
        async move {
            let filename = filename.trim_matches('/');
            if filename.is_empty() {
                return Err(StoreError::Config("empty filename".to_string()));
            }
            let mut preimage = Vec::with_capacity(filename.len() + 1 + bytes.len());
            preimage.extend_from_slice(filename.as_bytes());
            preimage.push(0);
            preimage.extend_from_slice(&bytes);
            let cid = hex::encode(keccak256(&preimage));
            let address = ContentAddress::parse(&cid)
                .ok_or_else(|| StoreError::Decode(format!("invalid address {cid}")))?;

            self.documents
                .write()
                .await
                .insert(format!("{cid}/{filename}"), bytes);
            tracing::debug!(%address, filename, "document stored in memory");
            Ok(address)
        }
        .boxed()
    }

    fn fetch_bytes<'a>(
        &'a self,
        address: &'a ContentAddress,
    ) -> BoxFuture<'a, Result<Vec<u8>, StoreError>> {
        async move {
            self.documents
                .read()
                .await
                .get(address.as_str())
                .cloned()
                .ok_or_else(|| StoreError::NotFound(address.to_string()))
        }
        .boxed()
    }

    fn gateway(&self) -> &IpfsGateway {
        &self.gateway
    }
}
