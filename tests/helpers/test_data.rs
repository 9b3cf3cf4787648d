//! Test data fixtures

use std::sync::Arc;
use std::time::Duration;
use chrono::NaiveDate;
use ClassroomHub::models::{
    AttendanceStatus, ClassInput, GradeInput, StudentInput, StudentStatus,
};
use ClassroomHub::{InMemoryRecordStore, ServiceFactory, Settings};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn student_input(name: &str) -> StudentInput {
    let slug = name.to_lowercase().replace(' ', ".");
    StudentInput {
        name: name.to_string(),
        email: format!("{}@school.test", slug),
        phone: Some("555-0100".to_string()),
        grade_level: "7".to_string(),
        section: "B".to_string(),
        enrollment_date: date(2023, 9, 1),
        status: StudentStatus::Active,
    }
}

pub fn class_input(name: &str, grade_level: &str, section: &str) -> ClassInput {
    ClassInput {
        name: name.to_string(),
        grade_level: grade_level.to_string(),
        section: section.to_string(),
        capacity: 30,
    }
}

pub fn grade_input(student_id: i64, subject: &str, grade_type: &str, on: NaiveDate) -> GradeInput {
    GradeInput {
        subject: subject.to_string(),
        score: 18.0,
        max_score: 20.0,
        grade_type: grade_type.to_string(),
        semester: "Fall".to_string(),
        date: on,
        student_id,
    }
}

pub fn absent() -> AttendanceStatus {
    AttendanceStatus::Absent
}

/// Services on a fresh in-memory store
pub fn memory_services() -> (ServiceFactory, InMemoryRecordStore) {
    ServiceFactory::in_memory(&Settings::default()).expect("in-memory services")
}

/// Services on an in-memory store that delays every request, so concurrent
/// upserts interleave between their lookup and their write
pub fn slow_memory_services(serialize_upserts: bool) -> (ServiceFactory, InMemoryRecordStore) {
    let mut settings = Settings::default();
    settings.features.serialize_upserts = serialize_upserts;

    let store = InMemoryRecordStore::new().with_latency(Duration::from_millis(20));
    let services = ServiceFactory::with_store(Arc::new(store.clone()), &settings).expect("slow in-memory services");
    (services, store)
}
