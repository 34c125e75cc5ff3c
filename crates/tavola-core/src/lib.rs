//! # tavola-core: Order Pricing Engine
//!
//! Computes the authoritative price of a food order and detects tampered
//! client totals.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tavola Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront (cart, checkout)                     │   │
//! │  │        submits items[] + deliveryFee + totalAmount              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  Order creation flow                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tavola-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │calculator │  │ validation │  │   parse   │  │   │
//! │  │   │ ItemPricer│  │ Totalizer │  │ PriceCheck │  │ lenient   │  │   │
//! │  │   │ options   │  │ + traits  │  │ tolerance  │  │ fields    │  │   │
//! │  │   └───────────┘  └─────┬─────┘  └────────────┘  └───────────┘  │   │
//! │  └────────────────────────┼────────────────────────────────────────┘   │
//! │                           │ ProductLookup / SettingsSource             │
//! │  ┌────────────────────────▼────────────────────────────────────────┐   │
//! │  │                     tavola-db (SQLite)                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog, order and quote types
//! - [`money`] - `Amount` decimal type
//! - [`parse`] - Lenient field parsing (prices, quantities, flags)
//! - [`pricing`] - Per-line pricing (promotions, options, packaging fee)
//! - [`calculator`] - Order totals, collaborator traits, order intake
//! - [`validation`] - Client/server total comparison, catalog checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tavola_core::money::Amount;
//! use tavola_core::pricing::price_line;
//! use tavola_core::types::{OrderLine, Product};
//!
//! let product: Product = serde_json::from_value(serde_json::json!({
//!     "id": "A", "name": "Margherita", "price": 8.5
//! })).unwrap();
//!
//! let line = OrderLine::new("A", 2);
//! let total = price_line(&line, Some(&product), Amount::new(0.3));
//! assert!((total.value() - 17.6).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod parse;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{FixedBoxFee, PriceCalculator, ProductLookup, SettingsSource};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Amount;
pub use types::*;
pub use validation::{validate_price, validate_price_default, PriceCheck};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default accepted difference between client and server totals, in currency
/// units.
pub const DEFAULT_PRICE_TOLERANCE: f64 = 1.0;
