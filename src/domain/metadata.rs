//! Off-chain event metadata stored in the content-addressed store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `{ "trait_type", "value" }` pair of the `attributes` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    /// Attribute name.
    pub trait_type: String,
    /// Attribute value (string, number or bool).
    pub value: Value,
}

/// JSON document pinned for every event and referenced by ticket URIs.
///
/// Known fields are typed; anything else the document carries is kept in
/// [`extra`](Self::extra) and written back unchanged. The default value is
/// the empty record substituted when a fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URI (`ipfs://`, bare content address or `http(s)://`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// ISO-8601 event date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Trait list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<MetadataAttribute>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataRecord {
    /// Returns `true` if the record carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Value of the attribute named `trait_type`, if present.
    #[must_use]
    pub fn attribute(&self, trait_type: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case(trait_type))
            .map(|a| &a.value)
    }

    /// Non-blank image reference.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_unknown_fields() {
        let doc = json!({
            "name": "Rust Conf",
            "external_url": "https://example.org",
            "attributes": [{ "trait_type": "Venue", "value": "Berlin" }]
        });
        let Ok(record) = serde_json::from_value::<MetadataRecord>(doc.clone()) else {
            panic!("metadata should deserialize");
        };
        assert_eq!(record.name.as_deref(), Some("Rust Conf"));
        assert_eq!(record.attribute("venue"), Some(&json!("Berlin")));
        assert_eq!(serde_json::to_value(&record).ok(), Some(doc));
    }

    #[test]
    fn default_is_empty() {
        assert!(MetadataRecord::default().is_empty());
        let record = MetadataRecord {
            image: Some("  ".to_string()),
            ..MetadataRecord::default()
        };
        assert!(!record.is_empty());
        assert!(record.image_ref().is_none());
    }
}
