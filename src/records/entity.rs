//! Entity trait and shared field types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use crate::utils::errors::Result;
use super::schema::TableSchema;

/// A record type stored in one remote table
pub trait Entity: Send + Sync + 'static {
    /// Record as returned by the store
    type Record: DeserializeOwned + Send;
    /// Writable fields accepted on create and update
    type Input: Serialize + Send + Sync;

    fn schema() -> Result<TableSchema>;

    /// Local checks run before any write round trip
    fn validate_input(_input: &Self::Input) -> Result<()> {
        Ok(())
    }
}

/// A reference to another record, with its display label when the store resolved one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReferenceRepr {
    Id(i64),
    Resolved {
        #[serde(rename = "Id")]
        id: i64,
        #[serde(rename = "Name", default)]
        name: Option<String>,
    },
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match ReferenceRepr::deserialize(deserializer)? {
            ReferenceRepr::Id(id) => Reference { id, name: None },
            ReferenceRepr::Resolved { id, name } => Reference { id, name },
        })
    }
}

impl Reference {
    /// Display label, falling back to `#id`
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_bare_id() {
        let reference: Reference = serde_json::from_str("42").unwrap();
        assert_eq!(reference, Reference { id: 42, name: None });
        assert_eq!(reference.label(), "#42");
    }

    #[test]
    fn test_reference_from_resolved_object() {
        let reference: Reference = serde_json::from_str(r#"{"Id": 42, "Name": "Ada Lovelace"}"#).unwrap();
        assert_eq!(reference.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(reference.label(), "Ada Lovelace");
    }

    #[test]
    fn test_reference_with_null_name() {
        let reference: Reference = serde_json::from_str(r#"{"Id": 3, "Name": null}"#).unwrap();
        assert_eq!(reference, Reference { id: 3, name: None });
    }
}
