//! Table schemas
//!
//! A `TableSchema` describes one remote collection: the fields requested on
//! reads, the subset accepted on writes, reference fields resolved to a
//! display label, the default ordering and how the display `Name` of a
//! record is derived. Schemas are checked once, when built.

use std::collections::HashSet;
use regex::Regex;
use serde_json::Value;
use crate::store::protocol::{FetchParams, FieldSpec, OrderBy, RawRecord, WhereClause, ID_FIELD, NAME_FIELD};
use crate::utils::errors::{ClassroomHubError, Result};

/// Placeholder syntax in name templates, `{fieldName}`
const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// One declared field of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    /// Display field to resolve on the referenced record
    pub reference_display: Option<String>,
}

/// How the display `Name` of a written record is derived
#[derive(Debug, Clone)]
pub enum NameRule {
    /// Records carry no derived name
    None,
    /// Copy an input field verbatim
    CopyField(String),
    /// Render a template such as `"Attendance - {date}"`
    Template(NameTemplate),
}

/// Name template with `{field}` placeholders
#[derive(Debug, Clone)]
pub struct NameTemplate {
    template: String,
    placeholders: Vec<String>,
    pattern: Regex,
}

impl NameTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let pattern = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| ClassroomHubError::Config(format!("Invalid placeholder pattern: {}", e)))?;

        let placeholders: Vec<String> = pattern
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect();

        if placeholders.is_empty() {
            return Err(ClassroomHubError::Config(
                format!("Name template '{}' has no placeholders", template)
            ));
        }

        Ok(Self {
            template: template.to_string(),
            placeholders,
            pattern,
        })
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Render against an input record; missing or null fields render empty
    pub fn render(&self, input: &RawRecord) -> String {
        self.pattern
            .replace_all(&self.template, |caps: &regex::Captures| {
                input.get(&caps[1]).map(display_value).unwrap_or_default()
            })
            .into_owned()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validated description of a remote collection
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: String,
    fields: Vec<SchemaField>,
    writable: HashSet<String>,
    default_order: Vec<OrderBy>,
    name_rule: NameRule,
}

impl TableSchema {
    pub fn builder(table: &str) -> TableSchemaBuilder {
        TableSchemaBuilder {
            table: table.to_string(),
            fields: Vec::new(),
            writable: Vec::new(),
            all_writable: false,
            default_order: Vec::new(),
            name_copy: None,
            name_template: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        self.writable.contains(name)
    }

    pub fn default_order(&self) -> &[OrderBy] {
        &self.default_order
    }

    pub fn name_rule(&self) -> &NameRule {
        &self.name_rule
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        self.fields
            .iter()
            .map(|f| match &f.reference_display {
                Some(display) => FieldSpec::reference(&f.name, display),
                None => FieldSpec::plain(&f.name),
            })
            .collect()
    }

    /// Parameters for listing the whole table in default order
    pub fn list_params(&self) -> FetchParams {
        FetchParams {
            fields: self.field_specs(),
            order_by: self.default_order.clone(),
            where_clauses: Vec::new(),
        }
    }

    /// Parameters for a single-record lookup
    pub fn get_params(&self) -> FetchParams {
        FetchParams {
            fields: self.field_specs(),
            ..Default::default()
        }
    }

    /// Parameters for a filtered listing in default order
    pub fn filter_params(&self, where_clauses: Vec<WhereClause>) -> Result<FetchParams> {
        for clause in &where_clauses {
            if !self.has_field(&clause.field_name) {
                return Err(ClassroomHubError::InvalidInput(format!(
                    "Unknown field '{}' on table '{}'", clause.field_name, self.table
                )));
            }
        }

        Ok(FetchParams {
            where_clauses,
            ..self.list_params()
        })
    }

    /// Derive the display name for an input record, if the schema has a rule
    pub fn derive_name(&self, input: &RawRecord) -> Option<String> {
        match &self.name_rule {
            NameRule::None => None,
            NameRule::CopyField(field) => Some(input.get(field).map(display_value).unwrap_or_default()),
            NameRule::Template(template) => Some(template.render(input)),
        }
    }

    /// Turn an input record into a write payload record
    ///
    /// The name is derived from the full input first, then every key outside
    /// the writable set is dropped. `id` is added for updates.
    pub fn write_record(&self, input: &RawRecord, id: Option<i64>) -> RawRecord {
        let name = self.derive_name(input);

        let mut record: RawRecord = input
            .iter()
            .filter(|(key, _)| self.is_writable(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let Some(name) = name {
            record.insert(NAME_FIELD.to_string(), Value::String(name));
        }
        if let Some(id) = id {
            record.insert(ID_FIELD.to_string(), Value::from(id));
        }

        record
    }
}

/// Builder for `TableSchema`
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    table: String,
    fields: Vec<SchemaField>,
    writable: Vec<String>,
    all_writable: bool,
    default_order: Vec<OrderBy>,
    name_copy: Option<String>,
    name_template: Option<String>,
}

impl TableSchemaBuilder {
    pub fn field(mut self, name: &str) -> Self {
        self.fields.push(SchemaField { name: name.to_string(), reference_display: None });
        self
    }

    pub fn fields(mut self, names: &[&str]) -> Self {
        for name in names {
            self = self.field(name);
        }
        self
    }

    /// Reference field whose `display` field is resolved on reads
    pub fn reference(mut self, name: &str, display: &str) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            reference_display: Some(display.to_string()),
        });
        self
    }

    pub fn writable(mut self, names: &[&str]) -> Self {
        self.writable.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Every declared field is writable
    pub fn all_writable(mut self) -> Self {
        self.all_writable = true;
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.default_order.push(order);
        self
    }

    pub fn name_from(mut self, input_field: &str) -> Self {
        self.name_copy = Some(input_field.to_string());
        self
    }

    pub fn name_template(mut self, template: &str) -> Self {
        self.name_template = Some(template.to_string());
        self
    }

    pub fn build(self) -> Result<TableSchema> {
        let table = self.table;
        let invalid = |message: String| ClassroomHubError::Config(format!("Schema '{}': {}", table, message));

        if table.trim().is_empty() {
            return Err(ClassroomHubError::Config("Schema table name is required".to_string()));
        }
        if self.fields.is_empty() {
            return Err(invalid("at least one field is required".to_string()));
        }

        let mut declared = HashSet::new();
        for field in &self.fields {
            if field.name == ID_FIELD {
                return Err(invalid(format!("'{}' is assigned by the store and cannot be declared", ID_FIELD)));
            }
            if !declared.insert(field.name.clone()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
        }

        let writable: HashSet<String> = if self.all_writable {
            declared.clone()
        } else {
            self.writable.into_iter().collect()
        };
        if let Some(unknown) = writable.iter().find(|w| !declared.contains(*w)) {
            return Err(invalid(format!("writable field '{}' is not declared", unknown)));
        }

        for order in &self.default_order {
            if !declared.contains(&order.field_name) {
                return Err(invalid(format!("order field '{}' is not declared", order.field_name)));
            }
        }

        let name_rule = match (self.name_copy, self.name_template) {
            (Some(_), Some(_)) => {
                return Err(invalid("name can be copied or templated, not both".to_string()));
            }
            (Some(field), None) => NameRule::CopyField(field),
            (None, Some(template)) => {
                let template = NameTemplate::parse(&template)?;
                if let Some(unknown) = template.placeholders().iter().find(|p| !writable.contains(*p)) {
                    return Err(invalid(format!("name placeholder '{}' is not a writable field", unknown)));
                }
                NameRule::Template(template)
            }
            (None, None) => NameRule::None,
        };

        if !matches!(name_rule, NameRule::None) && !writable.contains(NAME_FIELD) {
            return Err(invalid(format!("a name rule requires '{}' to be writable", NAME_FIELD)));
        }

        Ok(TableSchema {
            table,
            fields: self.fields,
            writable,
            default_order: self.default_order,
            name_rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn attendance_schema() -> TableSchema {
        TableSchema::builder("attendance")
            .fields(&["Name", "date", "status", "reason"])
            .reference("studentId", "Name")
            .all_writable()
            .order_by(OrderBy::desc("date"))
            .name_template("Attendance - {date}")
            .build()
            .unwrap()
    }

    #[test]
    fn test_template_render() {
        let template = NameTemplate::parse("{subject} - {gradeType}").unwrap();
        assert_eq!(template.placeholders(), &["subject".to_string(), "gradeType".to_string()]);
        let rendered = template.render(&raw(json!({ "subject": "Math", "gradeType": "Quiz" })));
        assert_eq!(rendered, "Math - Quiz");
    }

    #[test]
    fn test_template_missing_fields_render_empty() {
        let template = NameTemplate::parse("Score {score} of {maxScore}").unwrap();
        assert_eq!(template.render(&raw(json!({ "score": 9.5 }))), "Score 9.5 of ");
    }

    #[test]
    fn test_template_requires_placeholder() {
        assert_matches!(NameTemplate::parse("Attendance"), Err(ClassroomHubError::Config(_)));
    }

    #[test]
    fn test_write_record_strips_and_derives_name() {
        let schema = attendance_schema();
        let record = schema.write_record(
            &raw(json!({ "date": "2024-01-10", "status": "absent", "studentId": 42, "Id": 99, "extra": true })),
            None,
        );

        assert_eq!(record.get("Name"), Some(&json!("Attendance - 2024-01-10")));
        assert_eq!(record.get("studentId"), Some(&json!(42)));
        assert!(record.get("extra").is_none());
        assert!(record.get("Id").is_none());
    }

    #[test]
    fn test_write_record_with_id() {
        let schema = attendance_schema();
        let record = schema.write_record(&raw(json!({ "date": "2024-01-10" })), Some(7));
        assert_eq!(record.get("Id"), Some(&json!(7)));
    }

    #[test]
    fn test_copy_name_from_input_only_field() {
        let schema = TableSchema::builder("class")
            .fields(&["Name", "capacity"])
            .all_writable()
            .name_from("name")
            .build()
            .unwrap();

        let record = schema.write_record(&raw(json!({ "name": "7B", "capacity": 30 })), None);
        assert_eq!(record.get("Name"), Some(&json!("7B")));
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_list_params_request_references() {
        let params = attendance_schema().list_params();
        assert_eq!(params.fields.len(), 5);
        assert!(params.fields[4].reference_field.is_some());
        assert_eq!(params.order_by, vec![OrderBy::desc("date")]);
    }

    #[test]
    fn test_filter_params_reject_unknown_field() {
        let schema = attendance_schema();
        let result = schema.filter_params(vec![WhereClause::equal_to("grade", json!(1))]);
        assert_matches!(result, Err(ClassroomHubError::InvalidInput(_)));
    }

    #[test]
    fn test_build_rejects_inconsistent_schemas() {
        let undeclared_writable = TableSchema::builder("t").field("a").writable(&["b"]).build();
        assert_matches!(undeclared_writable, Err(ClassroomHubError::Config(msg)) if msg.contains("'b'"));

        let duplicate = TableSchema::builder("t").fields(&["a", "a"]).build();
        assert!(duplicate.is_err());

        let id_declared = TableSchema::builder("t").field("Id").build();
        assert!(id_declared.is_err());

        let bad_order = TableSchema::builder("t").field("a").order_by(OrderBy::asc("z")).build();
        assert!(bad_order.is_err());

        let no_name_field = TableSchema::builder("t").field("date").all_writable().name_template("X {date}").build();
        assert!(no_name_field.is_err());

        let bad_placeholder = TableSchema::builder("t")
            .fields(&["Name", "date"])
            .all_writable()
            .name_template("X {day}")
            .build();
        assert!(bad_placeholder.is_err());

        assert!(TableSchema::builder(" ").field("a").build().is_err());
    }
}
