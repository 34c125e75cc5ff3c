//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories as Engine Collaborators                 │
//! │                                                                         │
//! │  PriceCalculator (tavola-core)                                         │
//! │       │                                                                 │
//! │       ├── ProductLookup::find_by_ids ──────► ProductRepository         │
//! │       │                                       └── products table       │
//! │       │                                                                 │
//! │       └── SettingsSource::find_active_primary ► SettingsRepository     │
//! │                                               └── restaurant_settings  │
//! │                                                                         │
//! │  The engine never sees SQL; tests swap in in-memory fakes.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog reads and imports
//! - [`SettingsRepository`](settings::SettingsRepository) - Restaurant settings

pub mod product;
pub mod settings;
