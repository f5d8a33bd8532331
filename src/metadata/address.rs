//! Content addresses and gateway URL resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque content address, optionally followed by a path inside the
/// pinned folder (`<cid>/metadata.json`).
///
/// The `ipfs://` scheme and a leading `ipfs/` segment are stripped on
/// construction, so `ipfs://bafy/x.json` and `bafy/x.json` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Normalises `raw`; returns `None` if nothing is left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix("ipfs://").unwrap_or(trimmed);
        let stripped = stripped.strip_prefix("ipfs/").unwrap_or(stripped);
        let stripped = stripped.trim_matches('/');
        if stripped.is_empty() || stripped.contains("://") {
            return None;
        }
        Some(Self(stripped.to_string()))
    }

    /// Root content identifier (first path segment).
    #[must_use]
    pub fn cid(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Path inside the pinned folder, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, path)| path)
    }

    /// This address if it already names a file, otherwise
    /// `<cid>/<filename>`.
    #[must_use]
    pub fn document(&self, filename: &str) -> Self {
        if self.path().is_some() {
            self.clone()
        } else {
            Self(format!("{}/{filename}", self.0))
        }
    }

    /// Normalised string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ipfs://` URI of this address.
    #[must_use]
    pub fn to_uri(&self) -> String {
        format!("ipfs://{}", self.0)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP gateway in front of the content-addressed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpfsGateway {
    base_url: String,
    default_filename: String,
}

impl IpfsGateway {
    /// Gateway at `base_url` (e.g. `https://gateway.pinata.cloud/ipfs`)
    /// serving `<cid>/<default_filename>` for folder addresses.
    #[must_use]
    pub fn new(base_url: &str, default_filename: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_filename: default_filename.trim_matches('/').to_string(),
        }
    }

    /// File fetched for addresses that carry no path.
    #[must_use]
    pub fn default_filename(&self) -> &str {
        &self.default_filename
    }

    /// Gateway URL of `address` as stored.
    #[must_use]
    pub fn url_of(&self, address: &ContentAddress) -> String {
        format!("{}/{}", self.base_url, address)
    }

    /// Gateway URL of the metadata document behind `address`.
    #[must_use]
    pub fn document_url(&self, address: &ContentAddress) -> String {
        self.url_of(&address.document(&self.default_filename))
    }

    /// Resolves a URI to something a browser can load.
    ///
    /// `http(s)://` URLs pass through; `ipfs://` URIs and bare content
    /// addresses map onto the gateway. Blank or unsupported input yields
    /// `None`.
    #[must_use]
    pub fn resolve_url(&self, uri: &str) -> Option<String> {
        let trimmed = uri.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Some(trimmed.to_string());
        }
        ContentAddress::parse(trimmed).map(|address| self.url_of(&address))
    }
}
