//! Quote CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use tavola_core::validation::validate_tolerance;
use tavola_core::{Amount, DEFAULT_PRICE_TOLERANCE};

/// Quote CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Accepted difference between submitted and computed totals
    pub price_tolerance: Amount,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl QuoteConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("TAVOLA_DATABASE_PATH")
            .unwrap_or_else(|| "./tavola_dev.db".to_string());
        if database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "TAVOLA_DATABASE_PATH".to_string(),
            ));
        }

        let tolerance: f64 = match lookup("TAVOLA_PRICE_TOLERANCE") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TAVOLA_PRICE_TOLERANCE".to_string()))?,
            None => DEFAULT_PRICE_TOLERANCE,
        };
        let price_tolerance = validate_tolerance(tolerance)
            .map_err(|_| ConfigError::InvalidValue("TAVOLA_PRICE_TOLERANCE".to_string()))?;

        let run_migrations = match lookup("TAVOLA_RUN_MIGRATIONS") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "TAVOLA_RUN_MIGRATIONS".to_string(),
                    ))
                }
            },
            None => true,
        };

        Ok(QuoteConfig {
            database_path: PathBuf::from(database_path),
            price_tolerance,
            run_migrations,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
