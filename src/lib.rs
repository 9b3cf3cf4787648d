//! ClassroomHub records
//!
//! Typed access to the school records (students, classes, grades and
//! attendance) kept in a hosted record store. One generic record client is
//! instantiated per table from a declarative schema.

#![allow(non_snake_case)]

pub mod config;
pub mod models;
pub mod records;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ClassroomHubError, Result};

// Re-export main components for easy access
pub use records::{Entity, RecordClient, TableSchema};
pub use services::{AttendanceService, ServiceFactory};
pub use store::{HttpRecordStore, InMemoryRecordStore, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
