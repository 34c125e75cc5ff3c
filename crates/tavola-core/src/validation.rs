//! # Validation Module
//!
//! Price validation and catalog input checks.
//!
//! ## Anti-Tampering Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Price Validation                             │
//! │                                                                         │
//! │  Storefront                             Server                          │
//! │  ──────────                             ──────                          │
//! │  cart total: 23.90 ──┐          ┌── total_order(): 23.90                │
//! │                      ▼          ▼                                       │
//! │              validate_price(client, server, tolerance) ← THIS MODULE   │
//! │                      │                                                  │
//! │                      ├── |client - server| <= tolerance → accept        │
//! │                      │                                                  │
//! │                      └── otherwise → caller refuses the order           │
//! │                          ("pricing could not be confirmed")             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check is a value, not an error: [`PriceCheck`] reports the outcome and
//! the caller decides what to do with it.
//!
//! ## Usage
//! ```rust
//! use tavola_core::money::Amount;
//! use tavola_core::validation::validate_price;
//!
//! let check = validate_price(Amount::new(10.0), Amount::new(11.0), Amount::new(1.0));
//! assert!(check.is_valid);
//! assert_eq!(check.difference.value(), 1.0);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Amount;
use crate::DEFAULT_PRICE_TOLERANCE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Price Validation
// =============================================================================

/// Outcome of comparing a client-submitted total with the server total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceCheck {
    pub is_valid: bool,
    /// Absolute difference between the two totals.
    pub difference: Amount,
    pub client_amount: Amount,
    pub server_amount: Amount,
    pub tolerance: Amount,
}

/// Compares a client total against the server total.
///
/// Valid when the absolute difference is at most `tolerance`; the boundary
/// itself is accepted.
///
/// ## Example
/// ```rust
/// use tavola_core::money::Amount;
/// use tavola_core::validation::validate_price;
///
/// let tol = Amount::new(1.0);
/// assert!(validate_price(Amount::new(10.0), Amount::new(11.0), tol).is_valid);
/// assert!(!validate_price(Amount::new(10.0), Amount::new(11.01), tol).is_valid);
/// ```
pub fn validate_price(client_amount: Amount, server_amount: Amount, tolerance: Amount) -> PriceCheck {
    let difference = client_amount.abs_diff(server_amount);

    PriceCheck {
        is_valid: difference <= tolerance,
        difference,
        client_amount,
        server_amount,
        tolerance,
    }
}

/// [`validate_price`] with the default tolerance of one currency unit.
pub fn validate_price_default(client_amount: Amount, server_amount: Amount) -> PriceCheck {
    validate_price(
        client_amount,
        server_amount,
        Amount::new(DEFAULT_PRICE_TOLERANCE),
    )
}

/// Validates a configured price tolerance.
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative (zero means exact match)
pub fn validate_tolerance(tolerance: f64) -> ValidationResult<Amount> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "tolerance".to_string(),
            reason: "must be a non-negative number".to_string(),
        });
    }

    Ok(Amount::new(tolerance))
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens, underscores
///
/// ## Example
/// ```rust
/// use tavola_core::validation::validate_sku;
///
/// assert!(validate_sku("PIZ-MARG").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: not blank, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates that a catalog price is not negative. Zero is allowed.
pub fn validate_price_amount(field: &str, amount: Amount) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
