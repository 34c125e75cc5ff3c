//! # Connection Pool
//!
//! Opens the SQLite database behind the pricing engine and hands out
//! repositories.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Database lifecycle                             │
//! │                                                                         │
//! │  DbConfig::new("tavola.db")        DbConfig::in_memory()                │
//! │          │                                 │                            │
//! │          └──────────────┬──────────────────┘                            │
//! │                         ▼                                               │
//! │             connect_options()   WAL, NORMAL sync, busy timeout          │
//! │                         │                                               │
//! │                         ▼                                               │
//! │             Database::new()     pool + embedded migrations             │
//! │                         │                                               │
//! │        ┌────────────────┼────────────────────┐                          │
//! │        ▼                ▼                    ▼                          │
//! │   products()       settings()       price_calculator()                 │
//! │                                                                         │
//! │  One order issues its settings read and its product read together,     │
//! │  so a file database wants at least two connections.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL lets catalog imports write while orders are being priced.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tavola_core::PriceCalculator;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::settings::SettingsRepository;

/// Path that selects a private in-memory database.
const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// DbConfig
// =============================================================================

/// Where and how to open the database.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/tavola/tavola.db")
///     .max_connections(8)
///     .acquire_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,

    pub max_connections: u32,
    pub min_connections: u32,

    /// How long a query waits for a free connection. Every catalog and
    /// settings read made while pricing an order is bounded by this.
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections open forever.
    pub idle_timeout: Option<Duration>,

    /// Apply embedded migrations when the pool opens.
    pub migrate: bool,
}

impl DbConfig {
    /// File database with production pool sizes.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            migrate: true,
        }
    }

    /// Private in-memory database, for tests and one-off runs.
    ///
    /// Uses a single connection that is never recycled: each SQLite memory
    /// connection is its own database, and closing it drops the data.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.migrate = run;
        self
    }

    /// Whether this config points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// SQLite connection options derived from this config.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::Unavailable(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5)))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the open pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, migrates the schema.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening database");

        let options = config.connect_options()?;
        debug!(in_memory = config.is_in_memory(), "Connect options ready");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
            "Database pool open"
        );

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending embedded migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Pricing engine backed by this database.
    ///
    /// ```rust,ignore
    /// let total = db.price_calculator().total_order(&lines, delivery_fee).await?;
    /// ```
    pub fn price_calculator(&self) -> PriceCalculator<ProductRepository, SettingsRepository> {
        PriceCalculator::new(self.products(), self.settings())
    }

    /// Closes every connection. Later queries fail with a pool error.
    pub async fn close(&self) {
        debug!("Closing database pool");
        self.pool.close().await;
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
