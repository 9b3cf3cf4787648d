//! Attendance model
//!
//! One logical record per student per day; see `AttendanceService::mark`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::records::{Entity, Reference, TableSchema};
use crate::store::protocol::OrderBy;
use crate::utils::errors::Result;

pub const TABLE: &str = "attendance";

string_enum! {
    /// Attendance status for a day
    AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub student_id: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: String,
    pub student_id: i64,
}

impl Entity for Attendance {
    type Record = Attendance;
    type Input = AttendanceInput;

    fn schema() -> Result<TableSchema> {
        TableSchema::builder(TABLE)
            .fields(&["Name", "date", "status", "reason"])
            .reference("studentId", "Name")
            .all_writable()
            .order_by(OrderBy::desc("date"))
            .name_template("Attendance - {date}")
            .build()
    }
}
