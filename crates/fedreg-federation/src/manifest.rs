//! # Manifest — The Opaque Metadata Document Behind an Identifier
//!
//! The federation boundary treats manifests as opaque JSON objects owned
//! by the store collaborator. The only field this crate interprets is
//! `urn`, which a peer response must echo exactly (protection against
//! peer misrouting).

use fedreg_core::Urn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque JSON manifest, keyed at the federation boundary by its `urn`
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub Map<String, Value>);

impl Manifest {
    /// The `urn` field, when present and a string.
    pub fn urn(&self) -> Option<&str> {
        self.0.get("urn").and_then(Value::as_str)
    }

    /// Access an arbitrary field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Synthesize a minimal manifest from an identifier's own components.
    ///
    /// This is the fallback a store gateway serves when federation fails
    /// softly: enough metadata to answer the request, derived entirely
    /// from the URN itself.
    pub fn synthesize(urn: &Urn) -> Self {
        let c = urn.components();
        let mut fields = Map::new();
        fields.insert("@id".to_string(), Value::String(urn.as_str().to_string()));
        fields.insert("urn".to_string(), Value::String(urn.as_str().to_string()));
        fields.insert("type".to_string(), Value::String(c.record_type.clone()));
        fields.insert("category".to_string(), Value::String(c.category.clone()));
        fields.insert(
            "jurisdiction".to_string(),
            Value::String(c.jurisdiction.clone()),
        );
        fields.insert(
            "localReference".to_string(),
            Value::String(c.local_reference.clone()),
        );
        fields.insert("uuid".to_string(), Value::String(c.uuid.clone()));
        fields.insert(
            "label".to_string(),
            Value::String(format!(
                "{} {} ({})",
                c.record_type,
                c.local_reference,
                c.jurisdiction.to_ascii_uppercase()
            )),
        );
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedreg_core::{CatalogSnapshot, MintRequest, UrnPolicy};

    #[test]
    fn synthesized_manifest_carries_the_components() {
        let urn = Urn::generate(
            &MintRequest {
                jurisdiction: "nrw",
                category: "bimschg",
                record_type: "anlage",
                local_reference: "4711-0815-K1",
                uuid: None,
                version: None,
            },
            &UrnPolicy::default(),
            &CatalogSnapshot::unrestricted(),
        )
        .unwrap();

        let manifest = Manifest::synthesize(&urn);
        assert_eq!(manifest.urn(), Some(urn.as_str()));
        assert_eq!(
            manifest.get("label").and_then(|v| v.as_str()),
            Some("anlage 4711-0815-K1 (NRW)")
        );
        assert_eq!(
            manifest.get("jurisdiction").and_then(|v| v.as_str()),
            Some("nrw")
        );
    }

    #[test]
    fn urn_accessor_tolerates_missing_field() {
        let manifest = Manifest(Map::new());
        assert_eq!(manifest.urn(), None);
    }
}
