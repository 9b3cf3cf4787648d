//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `CLASSROOMHUB__STORE__API_URL`
pub const ENV_PREFIX: &str = "CLASSROOMHUB";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Remote record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub api_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files; stdout only when unset
    pub directory: Option<String>,
    pub file_prefix: String,
    pub json: bool,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    /// Serialize natural-key upserts within this process
    pub serialize_upserts: bool,
}

impl Settings {
    /// Load settings from `config.toml` (optional) and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit configuration file
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        Self::load(config::File::with_name(path).required(true))
    }

    fn load<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();

        let settings = config::Config::builder()
            .set_default("store.api_url", defaults.store.api_url)?
            .set_default("store.project_id", defaults.store.project_id)?
            .set_default("store.public_key", defaults.store.public_key)?
            .set_default("store.timeout_seconds", defaults.store.timeout_seconds)?
            .set_default("store.user_agent", defaults.store.user_agent)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.file_prefix", defaults.logging.file_prefix)?
            .set_default("logging.json", defaults.logging.json)?
            .set_default("features.serialize_upserts", defaults.features.serialize_upserts)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ClassroomHubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                api_url: "http://localhost:8080/api".to_string(),
                project_id: "local".to_string(),
                public_key: "local-development-key".to_string(),
                timeout_seconds: 10,
                user_agent: "ClassroomHub/1.0".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                file_prefix: "classroomhub.log".to_string(),
                json: false,
            },
            features: FeaturesConfig {
                serialize_upserts: true,
            },
        }
    }
}
