//! Runtime configuration: data file locations and logging settings.
//!
//! Resolution order is defaults, then `SHOPDESK_*` environment variables,
//! then explicit overrides from the caller (CLI flags).

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Default CRM data file, relative to the working directory.
pub const DEFAULT_CRM_DATA_FILE: &str = "veriler.json";
/// Default instrument-store data file, relative to the working directory.
pub const DEFAULT_STORE_DATA_FILE: &str = "store_data.json";

pub const ENV_CRM_FILE: &str = "SHOPDESK_CRM_FILE";
pub const ENV_STORE_FILE: &str = "SHOPDESK_STORE_FILE";
pub const ENV_LOG_LEVEL: &str = "SHOPDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SHOPDESK_LOG_DIR";

/// Logging settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub crm_data_file: PathBuf,
    pub store_data_file: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crm_data_file: PathBuf::from(DEFAULT_CRM_DATA_FILE),
            store_data_file: PathBuf::from(DEFAULT_STORE_DATA_FILE),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_CRM_FILE) {
            config.crm_data_file = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_STORE_FILE) {
            config.store_data_file = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.logging.log_dir = Some(PathBuf::from(dir));
        }
        config
    }
}
