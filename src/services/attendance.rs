//! Attendance service implementation
//!
//! Wraps the attendance record client with the one-record-per-student-per-day
//! upsert used when taking a register, plus filtered listings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use crate::models::attendance::{Attendance, AttendanceInput, AttendanceStatus};
use crate::records::RecordClient;
use crate::utils::errors::Result;

/// Attendance service
#[derive(Clone, Debug)]
pub struct AttendanceService {
    records: RecordClient<Attendance>,
}

impl AttendanceService {
    /// Create a new AttendanceService instance
    pub fn new(records: RecordClient<Attendance>) -> Self {
        Self { records }
    }

    /// Underlying record client
    pub fn records(&self) -> &RecordClient<Attendance> {
        &self.records
    }

    pub async fn list_all(&self) -> Result<Vec<Attendance>> {
        self.records.list_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Attendance> {
        self.records.get_by_id(id).await
    }

    pub async fn create(&self, input: &AttendanceInput) -> Result<Attendance> {
        self.records.create(input).await
    }

    pub async fn update(&self, id: i64, input: &AttendanceInput) -> Result<Attendance> {
        self.records.update(id, input).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.records.delete(id).await
    }

    /// Record a student's status for a day, replacing any earlier entry for that day
    ///
    /// Keyed on (studentId, date). See `RecordClient::upsert_by_key` for the
    /// guarantees against concurrent writers.
    pub async fn mark(
        &self,
        student_id: i64,
        date: NaiveDate,
        status: AttendanceStatus,
        reason: Option<String>,
    ) -> Result<Attendance> {
        let input = AttendanceInput {
            date,
            status,
            reason: reason.unwrap_or_default(),
            student_id,
        };

        let natural_key = [
            ("studentId", Value::from(student_id)),
            ("date", serde_json::to_value(date)?),
        ];

        let record = self.records.upsert_by_key(&natural_key, &input).await?;
        info!(student_id = student_id, date = %date, record_id = record.id, status = %input.status, "Attendance marked");
        Ok(record)
    }

    /// All attendance entries of one student, newest first
    pub async fn for_student(&self, student_id: i64) -> Result<Vec<Attendance>> {
        self.records.find_where(&[("studentId", Value::from(student_id))]).await
    }

    /// All attendance entries for one day
    pub async fn on_date(&self, date: NaiveDate) -> Result<Vec<Attendance>> {
        self.records.find_where(&[("date", serde_json::to_value(date)?)]).await
    }

    /// Per-status counts for one student
    pub async fn summary_for_student(&self, student_id: i64) -> Result<AttendanceSummary> {
        let entries = self.for_student(student_id).await?;
        Ok(AttendanceSummary::from_records(&entries))
    }
}

/// Attendance counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
    pub other: u32,
}

impl AttendanceSummary {
    pub fn from_records(records: &[Attendance]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match &record.status {
                Some(AttendanceStatus::Present) => summary.present += 1,
                Some(AttendanceStatus::Absent) => summary.absent += 1,
                Some(AttendanceStatus::Late) => summary.late += 1,
                Some(AttendanceStatus::Excused) => summary.excused += 1,
                Some(AttendanceStatus::Other(_)) | None => summary.other += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused + self.other
    }

    /// Share of days attended (present or late), as a percentage
    pub fn attendance_rate(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(f64::from(self.present + self.late) / f64::from(total) * 100.0)
    }
}
