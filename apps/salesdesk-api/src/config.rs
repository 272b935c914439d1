//! # Application Configuration
//!
//! Loaded once at startup and read-only afterwards.
//!
//! ## Environment Variables
//! | Variable                       | Default        |
//! |--------------------------------|----------------|
//! | `SALESDESK_DB_PATH`            | `salesdesk.db` |
//! | `SALESDESK_DB_MAX_CONNECTIONS` | `5`            |
//! | `SALESDESK_DEFAULT_CURRENCY`   | `INR`          |
//! | `SALESDESK_PAGE_SIZE`          | `20`           |

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use salesdesk_core::DEFAULT_CURRENCY;
use salesdesk_db::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use salesdesk_db::DbConfig;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Currency for requests that don't name one (ISO 4217)
    pub default_currency: String,

    /// Page size for listings that don't ask for one
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("salesdesk.db"),
            db_max_connections: 5,
            default_currency: DEFAULT_CURRENCY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `SALESDESK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("SALESDESK_DB_PATH") {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue("SALESDESK_DB_PATH".to_string()));
            }
            config.db_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("SALESDESK_DB_MAX_CONNECTIONS") {
            config.db_max_connections = max
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("SALESDESK_DB_MAX_CONNECTIONS".to_string()))?;
        }

        if let Some(currency) = lookup("SALESDESK_DEFAULT_CURRENCY") {
            let currency = currency.trim().to_ascii_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::InvalidValue("SALESDESK_DEFAULT_CURRENCY".to_string()));
            }
            config.default_currency = currency;
        }

        if let Some(size) = lookup("SALESDESK_PAGE_SIZE") {
            config.page_size = size
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                .ok_or_else(|| ConfigError::InvalidValue("SALESDESK_PAGE_SIZE".to_string()))?;
        }

        Ok(config)
    }

    /// Pool settings for [`salesdesk_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone()).max_connections(self.db_max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
