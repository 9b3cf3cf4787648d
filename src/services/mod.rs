//! Services module
//!
//! This module wires one shared record store into a typed client per table.

pub mod attendance;

pub use attendance::{AttendanceService, AttendanceSummary};

use std::sync::Arc;
use tracing::{info, warn};
use crate::config::settings::Settings;
use crate::models::{Attendance, Grade, SchoolClass, Student};
use crate::records::{KeyLocks, RecordClient};
use crate::store::{HttpRecordStore, InMemoryRecordStore, RecordStore};
use crate::utils::errors::Result;

pub type StudentService = RecordClient<Student>;
pub type ClassService = RecordClient<SchoolClass>;
pub type GradeService = RecordClient<Grade>;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub students: StudentService,
    pub classes: ClassService,
    pub grades: GradeService,
    pub attendance: AttendanceService,
}

impl ServiceFactory {
    /// Create a ServiceFactory talking to the configured hosted store
    pub fn new(settings: &Settings) -> Result<Self> {
        let store = HttpRecordStore::new(&settings.store)?;
        info!(api_url = %settings.store.api_url, project_id = %settings.store.project_id, "Using hosted record store");
        Self::with_store(Arc::new(store), settings)
    }

    /// Create a ServiceFactory on any store implementation
    pub fn with_store(store: Arc<dyn RecordStore>, settings: &Settings) -> Result<Self> {
        let mut attendance = RecordClient::<Attendance>::new(store.clone())?;
        if settings.features.serialize_upserts {
            attendance = attendance.with_key_locks(Arc::new(KeyLocks::new()));
        }

        Ok(Self {
            students: RecordClient::new(store.clone())?,
            classes: RecordClient::new(store.clone())?,
            grades: RecordClient::new(store)?,
            attendance: AttendanceService::new(attendance),
        })
    }

    /// Create a ServiceFactory on a fresh in-memory store
    ///
    /// The store is returned too so callers can inspect it or inject faults.
    pub fn in_memory(settings: &Settings) -> Result<(Self, InMemoryRecordStore)> {
        let store = InMemoryRecordStore::new()
            .with_reference(crate::models::grade::TABLE, "studentId", crate::models::student::TABLE)
            .with_reference(crate::models::attendance::TABLE, "studentId", crate::models::student::TABLE);

        let factory = Self::with_store(Arc::new(store.clone()), settings)?;
        Ok((factory, store))
    }

    /// Health check for every table
    ///
    /// Each table gets one minimal query that matches no rows.
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let (students, classes, grades, attendance) = futures::join!(
            self.students.ping(),
            self.classes.ping(),
            self.grades.ping(),
            self.attendance.records().ping()
        );

        let tables = vec![
            TableHealth::from_result(self.students.table(), students),
            TableHealth::from_result(self.classes.table(), classes),
            TableHealth::from_result(self.grades.table(), grades),
            TableHealth::from_result(self.attendance.records().table(), attendance),
        ];

        ServiceHealthStatus { tables }
    }
}

/// Reachability of one table
#[derive(Debug, Clone)]
pub struct TableHealth {
    pub table: String,
    pub reachable: bool,
    pub error: Option<String>,
}

impl TableHealth {
    fn from_result(table: &str, result: Result<()>) -> Self {
        match result {
            Ok(()) => Self {
                table: table.to_string(),
                reachable: true,
                error: None,
            },
            Err(e) => {
                warn!(table = table, severity = %e.severity(), error = %e, "Table health check failed");
                Self {
                    table: table.to_string(),
                    reachable: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Health status for all tables
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub tables: Vec<TableHealth>,
}

impl ServiceHealthStatus {
    /// Check if every table is reachable
    pub fn is_healthy(&self) -> bool {
        self.tables.iter().all(|t| t.reachable)
    }

    /// Get list of unreachable tables with their errors
    pub fn get_issues(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|t| !t.reachable)
            .map(|t| format!("{}: {}", t.table, t.error.as_deref().unwrap_or("unreachable")))
            .collect()
    }
}
