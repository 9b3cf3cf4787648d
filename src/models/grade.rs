//! Grade model
//!
//! `score <= maxScore` is expected but left to the store to enforce.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::records::{Entity, Reference, TableSchema};
use crate::store::protocol::OrderBy;
use crate::utils::errors::{ClassroomHubError, Result};

pub const TABLE: &str = "grade";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub grade_type: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub student_id: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeInput {
    pub subject: String,
    pub score: f64,
    pub max_score: f64,
    pub grade_type: String,
    pub semester: String,
    pub date: NaiveDate,
    pub student_id: i64,
}

impl Entity for Grade {
    type Record = Grade;
    type Input = GradeInput;

    fn schema() -> Result<TableSchema> {
        TableSchema::builder(TABLE)
            .fields(&["Name", "subject", "score", "maxScore", "gradeType", "semester", "date"])
            .reference("studentId", "Name")
            .all_writable()
            .order_by(OrderBy::desc("date"))
            .name_template("{subject} - {gradeType}")
            .build()
    }

    fn validate_input(input: &GradeInput) -> Result<()> {
        if !input.score.is_finite() || !input.max_score.is_finite() {
            return Err(ClassroomHubError::InvalidInput("Grade scores must be finite numbers".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_with_resolved_student() {
        let grade: Grade = serde_json::from_value(json!({
            "Id": 11,
            "Name": "Math - Quiz",
            "score": 18,
            "maxScore": 20,
            "date": "2024-02-14",
            "studentId": { "Id": 42, "Name": "Ada Lovelace" }
        }))
        .unwrap();

        assert_eq!(grade.student_id.as_ref().map(|s| s.id), Some(42));
        assert_eq!(grade.score, Some(18.0));
        assert_eq!(grade.max_score, Some(20.0));
    }

    #[test]
    fn test_score_above_max_is_not_rejected_locally() {
        let input = GradeInput {
            subject: "Math".to_string(),
            score: 25.0,
            max_score: 20.0,
            grade_type: "Quiz".to_string(),
            semester: "Fall".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            student_id: 42,
        };
        assert!(Grade::validate_input(&input).is_ok());
    }
}
