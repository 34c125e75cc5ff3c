//! # Money Module
//!
//! Provides the `Amount` type used for every price, fee and total.
//!
//! ## Decimal, Not Cents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KNOWN PRECISION RISK                                                   │
//! │                                                                         │
//! │  The catalog stores prices as plain decimals (8.5, 0.3, ...) and the   │
//! │  storefront computes its own total with the same floating arithmetic.  │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  Amount keeps that representation so server and client totals are     │
//! │  computed the same way. Drift between them is absorbed by the price    │
//! │  tolerance (validation::validate_price), not by rounding here.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tavola_core::money::Amount;
//!
//! let price = Amount::new(8.5);
//! let fee = Amount::new(0.3);
//!
//! let line = (price + fee).multiply_quantity(2);
//! assert!((line.value() - 17.6).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary value in major currency units (e.g. euros), as a decimal.
///
/// Non-finite inputs (NaN, ±∞) are normalized to zero on construction, so an
/// `Amount` always holds a finite number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(export)]
pub struct Amount(f64);

impl Amount {
    /// Creates an amount, mapping non-finite values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use tavola_core::money::Amount;
    ///
    /// assert_eq!(Amount::new(4.0).value(), 4.0);
    /// assert!(Amount::new(f64::NAN).is_zero());
    /// ```
    #[inline]
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Amount(value)
        } else {
            Amount(0.0)
        }
    }

    /// Returns the raw decimal value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0.0)
    }

    /// Checks if the value is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Checks if the value is negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Amount(self.0.abs())
    }

    /// Absolute difference between two amounts.
    ///
    /// ## Example
    /// ```rust
    /// use tavola_core::money::Amount;
    ///
    /// let diff = Amount::new(10.0).abs_diff(Amount::new(11.0));
    /// assert_eq!(diff.value(), 1.0);
    /// ```
    #[inline]
    pub fn abs_diff(&self, other: Amount) -> Self {
        (*self - other).abs()
    }

    /// Multiplies by a unit count. An overflowing product is zero, like any
    /// other non-finite result.
    ///
    /// ## User Workflow
    /// ```text
    /// Margherita (9.00) + box fee (0.30)
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 18.60
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Amount::new(self.0 * f64::from(qty))
    }

    /// Divides by a unit count. A zero count yields zero.
    #[inline]
    pub fn per_unit(&self, qty: u32) -> Self {
        if qty == 0 {
            return Amount::zero();
        }
        Amount::new(self.0 / f64::from(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimals, for logs and error messages. Storefront formatting is
/// locale-aware and happens client side.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::new(value)
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount::new(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Amount::new(self.0 - other.0)
    }
}

impl Mul<u32> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_becomes_zero() {
        assert!(Amount::new(f64::NAN).is_zero());
        assert!(Amount::new(f64::INFINITY).is_zero());
        assert!(Amount::new(f64::NEG_INFINITY).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(23.9).to_string(), "23.90");
        assert_eq!(Amount::new(0.0).to_string(), "0.00");
        assert_eq!(Amount::new(-1.5).to_string(), "-1.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::new(8.5);
        let b = Amount::new(0.3);

        assert!(((a + b).value() - 8.8).abs() < 1e-9);
        assert!(((a - b).value() - 8.2).abs() < 1e-9);
        assert!(((a * 3).value() - 25.5).abs() < 1e-9);
    }

    #[test]
    fn test_per_unit() {
        assert_eq!(Amount::new(17.6).per_unit(2).value(), 8.8);
        assert!(Amount::new(5.0).per_unit(0).is_zero());
    }

    #[test]
    fn test_overflow_stays_finite() {
        assert!(Amount::new(f64::MAX).multiply_quantity(2).is_zero());
        assert!((Amount::new(f64::MAX) * 2).is_zero());
        assert!(Amount::new(f64::MAX).per_unit(1).value().is_finite());
    }

    #[test]
    fn test_sum() {
        let total: Amount = [1.0, 2.5, 0.5].into_iter().map(Amount::new).sum();
        assert_eq!(total.value(), 4.0);
    }

    /// Documents the floating drift that the price tolerance absorbs.
    #[test]
    fn test_float_drift_documented() {
        let sum = Amount::new(0.1) + Amount::new(0.2);
        assert_ne!(sum.value(), 0.3);
        assert!(sum.abs_diff(Amount::new(0.3)).value() < 1e-9);
    }
}
