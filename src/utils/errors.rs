//! Error handling for ClassroomHub
//!
//! This module defines the main error types used throughout the crate
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for ClassroomHub
#[derive(Error, Debug)]
pub enum ClassroomHubError {
    /// The store rejected the whole request (`success: false`)
    #[error("Record store error on '{table}': {message}")]
    Remote { table: String, message: String },

    /// The store rejected one record of a write batch
    #[error("Validation failed on '{table}': {message}")]
    Validation { table: String, message: String },

    #[error("Record not found in '{table}': {id}")]
    NotFound { table: String, id: i64 },

    #[error("Record store transport error: {0}")]
    Transport(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Record store transport errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record store request failed: {0}")]
    RequestFailed(String),

    #[error("Record store timeout")]
    Timeout,

    #[error("Invalid record store response: {0}")]
    InvalidResponse(String),

    #[error("Record store unavailable")]
    ServiceUnavailable,
}

/// Result type alias for ClassroomHub operations
pub type Result<T> = std::result::Result<T, ClassroomHubError>;

impl ClassroomHubError {
    pub fn remote(table: &str, message: impl Into<String>) -> Self {
        Self::Remote { table: table.to_string(), message: message.into() }
    }

    pub fn validation(table: &str, message: impl Into<String>) -> Self {
        Self::Validation { table: table.to_string(), message: message.into() }
    }

    pub fn not_found(table: &str, id: i64) -> Self {
        Self::NotFound { table: table.to_string(), id }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClassroomHubError::Remote { .. } => true,
            ClassroomHubError::Validation { .. } => false,
            ClassroomHubError::NotFound { .. } => false,
            ClassroomHubError::Transport(StoreError::InvalidResponse(_)) => false,
            ClassroomHubError::Transport(_) => true,
            ClassroomHubError::Config(_) => false,
            ClassroomHubError::InvalidInput(_) => false,
            ClassroomHubError::Http(_) => true,
            ClassroomHubError::Serialization(_) => false,
            ClassroomHubError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClassroomHubError::Config(_) => ErrorSeverity::Critical,
            ClassroomHubError::UrlParse(_) => ErrorSeverity::Critical,
            ClassroomHubError::Validation { .. } => ErrorSeverity::Warning,
            ClassroomHubError::NotFound { .. } => ErrorSeverity::Info,
            ClassroomHubError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
