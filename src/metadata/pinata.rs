//! Pinata pinning service client.
//!
//! Uploads go through `POST {api}/pinning/pinFileToIPFS` as multipart
//! `file` parts named `folder/<filename>`, which makes the returned
//! `IpfsHash` a folder CID. Reads go through the public gateway.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{ContentAddress, IpfsGateway, MetadataStore, StoreError};

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// [`MetadataStore`] backed by Pinata.
#[derive(Debug, Clone)]
pub struct PinataStore {
    client: reqwest::Client,
    api_url: String,
    jwt: String,
    gateway: IpfsGateway,
}

impl PinataStore {
    /// Creates a client for the API at `api_url` authenticated with `jwt`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(
        api_url: &str,
        jwt: &str,
        gateway: IpfsGateway,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt: jwt.to_string(),
            gateway,
        })
    }

    async fn pin(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<ContentAddress, StoreError> {
        let part = Part::bytes(bytes)
            .file_name(format!("folder/{}", filename.trim_matches('/')))
            .mime_str(content_type)
            .map_err(|e| StoreError::Config(format!("content type {content_type}: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let pinned: PinResponse = response.json().await?;

        let address = ContentAddress::parse(&pinned.ipfs_hash)
            .ok_or_else(|| StoreError::Decode("empty IpfsHash in pin response".to_string()))?;
        tracing::info!(%address, filename, "pinned to IPFS");
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>, StoreError> {
        let url = self.gateway.url_of(address);
        tracing::debug!(%url, "fetching from gateway");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(address.to_string()));
        }
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl MetadataStore for PinataStore {
    fn upload_bytes<'a>(
        &'a self,
        bytes: Vec<u8>,
        filename: &'a str,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<ContentAddress, StoreError>> {
        self.pin(bytes, filename, content_type).boxed()
    }

    fn fetch_bytes<'a>(
        &'a self,
        address: &'a ContentAddress,
    ) -> BoxFuture<'a, Result<Vec<u8>, StoreError>> {
        self.get(address).boxed()
    }

    fn gateway(&self) -> &IpfsGateway {
        &self.gateway
    }
}
