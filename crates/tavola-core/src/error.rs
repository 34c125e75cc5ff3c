//! # Error Types
//!
//! Domain-specific error types for tavola-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tavola-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing/lookup failures                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tavola-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                         (converted to CoreError::LookupFailed when     │
//! │                          raised behind a collaborator trait)           │
//! │                                                                         │
//! │  Flow: DbError → CoreError → order intake → user-facing message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bad numeric fields are NOT errors anywhere in this crate; they are parsed
//! to defaults by [`crate::parse`].

use thiserror::Error;

use crate::money::Amount;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bulk product lookup failed.
    ///
    /// ## When This Occurs
    /// - Catalog storage unreachable
    /// - Catalog record cannot be decoded
    ///
    /// An order cannot be priced without its catalog data, so this aborts
    /// the whole computation.
    #[error("Product lookup failed: {0}")]
    LookupFailed(String),

    /// Settings storage failed.
    ///
    /// Returned by `SettingsSource` implementations; the calculator recovers
    /// from it with a zero packaging fee and never propagates it.
    #[error("Restaurant settings unavailable: {0}")]
    SettingsUnavailable(String),

    /// Client total and server total differ by more than the tolerance.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (client total 20.00)
    ///      │
    ///      ▼
    /// Server total 23.90, tolerance 1.00
    ///      │
    ///      ▼
    /// PriceMismatch { client: 20.00, server: 23.90, difference: 3.90 }
    ///      │
    ///      ▼
    /// Storefront shows the message and reloads the cart
    /// ```
    #[error("Pricing could not be confirmed (submitted {client}, computed {server}), please retry")]
    PriceMismatch {
        client: Amount,
        server: Amount,
        difference: Amount,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Amount must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_mismatch_message() {
        let err = CoreError::PriceMismatch {
            client: Amount::new(20.0),
            server: Amount::new(23.9),
            difference: Amount::new(3.9),
        };
        assert_eq!(
            err.to_string(),
            "Pricing could not be confirmed (submitted 20.00, computed 23.90), please retry"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
