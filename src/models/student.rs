//! Student model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::records::{Entity, TableSchema};
use crate::store::protocol::OrderBy;
use crate::utils::errors::{ClassroomHubError, Result};

pub const TABLE: &str = "student";

string_enum! {
    /// Enrollment status of a student
    StudentStatus {
        Active => "active",
        Inactive => "inactive",
        Graduated => "graduated",
        Transferred => "transferred",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<StudentStatus>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == Some(StudentStatus::Active)
    }
}

/// Writable student fields; `name` becomes the record's `Name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub grade_level: String,
    pub section: String,
    pub enrollment_date: NaiveDate,
    pub status: StudentStatus,
}

impl Entity for Student {
    type Record = Student;
    type Input = StudentInput;

    fn schema() -> Result<TableSchema> {
        TableSchema::builder(TABLE)
            .fields(&["Name", "email", "phone", "gradeLevel", "section", "enrollmentDate", "status"])
            .all_writable()
            .order_by(OrderBy::asc("Name"))
            .name_from("name")
            .build()
    }

    fn validate_input(input: &StudentInput) -> Result<()> {
        if input.name.trim().is_empty() {
            return Err(ClassroomHubError::InvalidInput("Student name is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_builds() {
        let schema = Student::schema().unwrap();
        assert_eq!(schema.table(), "student");
        assert!(schema.is_writable("enrollmentDate"));
    }

    #[test]
    fn test_status_keeps_unknown_values() {
        let status: StudentStatus = serde_json::from_value(json!("Suspended")).unwrap();
        assert_eq!(status, StudentStatus::Other("Suspended".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Suspended"));

        let status: StudentStatus = serde_json::from_value(json!("Active")).unwrap();
        assert_eq!(status, StudentStatus::Active);
        assert_eq!(status.to_string(), "active");
    }

    #[test]
    fn test_decode_partial_record() {
        let student: Student = serde_json::from_value(json!({
            "Id": 3,
            "Name": "Ada Lovelace",
            "enrollmentDate": "2023-09-01",
            "status": "active",
            "phone": null
        }))
        .unwrap();

        assert_eq!(student.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(student.enrollment_date, NaiveDate::from_ymd_opt(2023, 9, 1));
        assert!(student.is_active());
        assert!(student.email.is_none());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let input = StudentInput {
            name: "  ".to_string(),
            email: "a@example.com".to_string(),
            phone: None,
            grade_level: "7".to_string(),
            section: "B".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            status: StudentStatus::Active,
        };
        assert!(Student::validate_input(&input).is_err());
    }
}
