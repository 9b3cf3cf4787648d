//! Class model

use serde::{Deserialize, Serialize};
use crate::records::{Entity, TableSchema};
use crate::store::protocol::OrderBy;
use crate::utils::errors::{ClassroomHubError, Result};

pub const TABLE: &str = "class";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    pub name: String,
    pub grade_level: String,
    pub section: String,
    pub capacity: u32,
}

impl Entity for SchoolClass {
    type Record = SchoolClass;
    type Input = ClassInput;

    fn schema() -> Result<TableSchema> {
        TableSchema::builder(TABLE)
            .fields(&["Name", "gradeLevel", "section", "capacity"])
            .all_writable()
            .order_by(OrderBy::asc("gradeLevel"))
            .order_by(OrderBy::asc("section"))
            .name_from("name")
            .build()
    }

    fn validate_input(input: &ClassInput) -> Result<()> {
        if input.capacity == 0 {
            return Err(ClassroomHubError::InvalidInput(
                format!("Class '{}' capacity must be a positive integer", input.name)
            ));
        }
        Ok(())
    }
}
