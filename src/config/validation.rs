//! Configuration validation module
//!
//! This module provides validation functions for configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ClassroomHubError, Result};
use super::Settings;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_store_config(&settings.store)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate record store configuration
fn validate_store_config(config: &super::StoreConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(ClassroomHubError::Config(
            "Record store API URL is required".to_string()
        ));
    }

    let url = url::Url::parse(&config.api_url)
        .map_err(|e| ClassroomHubError::Config(format!("Invalid record store API URL: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClassroomHubError::Config(
            format!("Unsupported record store URL scheme: {}", url.scheme())
        ));
    }

    if config.project_id.is_empty() {
        return Err(ClassroomHubError::Config(
            "Record store project ID is required".to_string()
        ));
    }

    if config.public_key.is_empty() {
        return Err(ClassroomHubError::Config(
            "Record store public key is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(ClassroomHubError::Config(
            "Record store timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ClassroomHubError::Config(
            "Log level is required".to_string()
        ));
    }

    if !VALID_LEVELS.contains(&config.level.as_str()) {
        return Err(ClassroomHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, VALID_LEVELS)
        ));
    }

    if config.directory.is_some() && config.file_prefix.is_empty() {
        return Err(ClassroomHubError::Config(
            "Log file prefix is required when a log directory is set".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut settings = Settings::default();
        settings.store.api_url = "not a url".to_string();
        assert_matches!(validate_settings(&settings), Err(ClassroomHubError::Config(_)));

        settings.store.api_url = "ftp://example.com".to_string();
        assert_matches!(validate_settings(&settings), Err(ClassroomHubError::Config(msg)) if msg.contains("scheme"));
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let mut settings = Settings::default();
        settings.store.public_key.clear();
        assert_matches!(validate_settings(&settings), Err(ClassroomHubError::Config(msg)) if msg.contains("public key"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.store.timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
