//! # Quantity Module
//!
//! Provides the `Quantity` type for stock quantities.
//!
//! ## Why Integer Quantities?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A ledger that compares "counted" against "system" cannot afford    │
//! │  a difference of 0.00000000000000004 metres of fabric.              │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Milli-Units                                  │
//! │    12.5 m  → 12500 milli-units                                      │
//! │    3 pc    → 3000 milli-units                                       │
//! │    Exact arithmetic, exact equality, exact differences.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atelier_core::quantity::Quantity;
//!
//! let on_hand = Quantity::from_milli(12_500); // 12.5 units
//! let counted = Quantity::from_units(10);     // 10 units
//!
//! let difference = counted - on_hand;         // -2.5 units
//! assert_eq!(difference.milli(), -2_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of milli-units per whole unit of measure.
pub const MILLI_PER_UNIT: i64 = 1_000;

/// A stock quantity in milli-units (thousandths of the unit of measure).
///
/// ## Design Decisions
/// - **i64 (signed)**: count differences are negative when the shelf holds
///   less than the system believes
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Three decimal places**: enough for fabric metres and trim weights;
///   piece counts use whole units
///
/// Every quantity in the ledger flows through this type: material on-hand
/// levels, reorder thresholds, movement line quantities, count snapshots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from milli-units.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::quantity::Quantity;
    ///
    /// let qty = Quantity::from_milli(12_500); // 12.5 units
    /// assert_eq!(qty.milli(), 12_500);
    /// ```
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Returns the value in milli-units.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated towards zero).
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / MILLI_PER_UNIT
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive. Movement and count lines
    /// require positive quantities.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }

    /// Counted minus system: the stored `difference` of an inventory line.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::quantity::Quantity;
    ///
    /// let system = Quantity::from_units(10);
    /// let counted = Quantity::from_units(7);
    /// assert_eq!(counted.diff_from(system), Quantity::from_units(-3));
    /// ```
    #[inline]
    pub const fn diff_from(&self, system: Quantity) -> Self {
        Quantity(self.0 - system.0)
    }
}

/// Display trims trailing zeros: `12.500` → `12.5`, `7.000` → `7`.
///
/// This is for logs and debugging; the presentation layer owns real
/// formatting and localization.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / MILLI_PER_UNIT;
        let frac = abs % MILLI_PER_UNIT;

        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let text = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, whole, text.trim_end_matches('0'))
        }
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_and_milli() {
        let qty = Quantity::from_units(12);
        assert_eq!(qty.milli(), 12_000);
        assert_eq!(qty.whole_units(), 12);

        let fractional = Quantity::from_milli(12_500);
        assert_eq!(fractional.whole_units(), 12);
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(format!("{}", Quantity::from_milli(12_500)), "12.5");
        assert_eq!(format!("{}", Quantity::from_milli(7_000)), "7");
        assert_eq!(format!("{}", Quantity::from_milli(1_250)), "1.25");
        assert_eq!(format!("{}", Quantity::from_milli(5)), "0.005");
        assert_eq!(format!("{}", Quantity::from_milli(-2_500)), "-2.5");
        assert_eq!(format!("{}", Quantity::zero()), "0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Quantity::from_units(10);
        let b = Quantity::from_milli(2_500);

        assert_eq!((a + b).milli(), 12_500);
        assert_eq!((a - b).milli(), 7_500);
        assert_eq!((-b).milli(), -2_500);
    }

    #[test]
    fn test_diff_from() {
        let system = Quantity::from_units(10);
        let counted = Quantity::from_units(7);

        assert_eq!(counted.diff_from(system).milli(), -3_000);
        assert_eq!(system.diff_from(system), Quantity::zero());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Quantity::from_units(1).is_positive());
        assert!(!Quantity::zero().is_positive());
        assert!(Quantity::from_milli(-1).is_negative());
        assert_eq!(Quantity::from_milli(-750).abs().milli(), 750);
    }

    #[test]
    fn test_ordering_supports_threshold_comparison() {
        let on_hand = Quantity::from_units(15);
        let threshold = Quantity::from_units(20);

        assert!(on_hand <= threshold);
        assert!(Quantity::from_units(20) <= threshold);
        assert!(!(Quantity::from_units(21) <= threshold));
    }
}
