//! # Database Errors
//!
//! ```text
//! sqlx::Error ─┐
//! MigrateError ├──► DbError ──► DbResult<T>         (repository API)
//! serde_json ──┘       │
//!                      └──────► CoreError            (engine traits)
//!                               ProductRepository  → LookupFailed
//!                               SettingsRepository → SettingsUnavailable
//! ```

use tavola_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be opened, or the pool is closed.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// No connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolTimeout,

    /// A UNIQUE constraint rejected the write. Holds `table.column`.
    #[error("Duplicate key {0}")]
    Duplicate(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row does not decode into its domain type.
    #[error("Invalid {entity} record {id}: {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// Record rejected before writing.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("JSON encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl DbError {
    pub fn invalid_record(entity: &'static str, id: impl Into<String>, reason: impl ToString) -> Self {
        DbError::InvalidRecord {
            entity,
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // SQLite: "UNIQUE constraint failed: products.id"
                match db_err.message().strip_prefix("UNIQUE constraint failed: ") {
                    Some(key) => DbError::Duplicate(key.to_string()),
                    None => DbError::Query(db_err.message().to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolTimeout,
            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

/// Catalog reads behind `ProductLookup` surface as lookup failures.
impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        CoreError::LookupFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
