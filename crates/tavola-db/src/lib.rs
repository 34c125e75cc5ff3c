//! # tavola-db: Database Layer for the Tavola pricing engine
//!
//! SQLite storage for the catalog and restaurant settings, exposed to the
//! pricing engine through its collaborator traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tavola Data Flow                                 │
//! │                                                                         │
//! │  Order creation (quote CLI / backend)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PriceCalculator (tavola-core)                                         │
//! │       │ ProductLookup / SettingsSource                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tavola-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ ProductRepository  │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ SettingsRepository │  │ 001_init   │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tavola_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tavola.db")).await?;
//! let total = db.price_calculator().total_order(&lines, delivery_fee).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;

// =============================================================================
// End-to-end Tests
// =============================================================================
