//! Record store wire protocol
//!
//! Request parameters and response envelopes exchanged with the hosted
//! record store. Field names follow the store's JSON conventions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier key carried by every record
pub const ID_FIELD: &str = "Id";

/// Display name key carried by every record
pub const NAME_FIELD: &str = "Name";

/// A raw record as exchanged with the store
pub type RawRecord = Map<String, Value>;

/// Field name wrapper, `{"Name": "email"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Display field resolved on the referenced record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceField {
    pub field: FieldName,
}

/// One requested field, optionally with reference resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: FieldName,
    #[serde(rename = "referenceField", skip_serializing_if = "Option::is_none", default)]
    pub reference_field: Option<ReferenceField>,
}

impl FieldSpec {
    pub fn plain(name: &str) -> Self {
        Self {
            field: FieldName { name: name.to_string() },
            reference_field: None,
        }
    }

    pub fn reference(name: &str, display_field: &str) -> Self {
        Self {
            field: FieldName { name: name.to_string() },
            reference_field: Some(ReferenceField {
                field: FieldName { name: display_field.to_string() },
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortType {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub sort_type: SortType,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self { field_name: field.to_string(), sort_type: SortType::Asc }
    }

    pub fn desc(field: &str) -> Self {
        Self { field_name: field.to_string(), sort_type: SortType::Desc }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
}

/// Where clause, `{"FieldName": "date", "Operator": "EqualTo", "Values": [..]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl WhereClause {
    pub fn equal_to(field: &str, value: Value) -> Self {
        Self {
            field_name: field.to_string(),
            operator: Operator::EqualTo,
            values: vec![value],
        }
    }
}

/// Parameters for list and lookup requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty", default)]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty", default)]
    pub where_clauses: Vec<WhereClause>,
}

/// Create/update payload, `{"records": [..]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsPayload {
    pub records: Vec<RawRecord>,
}

/// Delete payload, `{"RecordIds": [..]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

/// Response to a list request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<RawRecord>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a get-by-id request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome for one record of a write batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl RecordResult {
    pub fn ok(data: Option<RawRecord>) -> Self {
        Self { success: true, data, message: None, status_code: None }
    }

    pub fn failed(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self { success: false, data: None, message: Some(message.into()), status_code }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }
}

/// Response to create, update and delete requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default)]
    pub results: Option<Vec<RecordResult>>,
}

impl WriteResponse {
    /// Failed per-record results, in request order
    pub fn failed_results(&self) -> Vec<&RecordResult> {
        self.results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|result| !result.success)
            .collect()
    }
}
