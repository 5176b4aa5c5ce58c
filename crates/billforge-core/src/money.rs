//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                     │
//! │                                                                 │
//! │  In floating point: 0.1 + 0.2 = 0.30000000000000004             │
//! │  On an invoice: ₹10.00 / 3 = ₹3.33 (×3 = ₹9.99) → lost ₹0.01    │
//! │                                                                 │
//! │  OUR SOLUTION: integer paise. 1000 paise / 3 = 333 paise; the   │
//! │  lost paisa is visible and handled explicitly, never silently.  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in the system flows through this type:
//! catalog prices, line totals, subtotals, CGST/SGST amounts and
//! invoice totals. Only display code converts to rupees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Full serde support** for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Line totals are exact in paise, so per-line rounding never
    /// happens; rounding is applied once, at the GST split.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes one half of the GST due on this amount, rounded
    /// half-up to the paisa.
    ///
    /// CGST and SGST are each `amount * (rate / 2)`; the division by
    /// 20000 folds the basis-point scale (10000) and the halving
    /// together so each half is rounded exactly once:
    ///
    /// ```text
    /// half = (paise * bps + 10000) / 20000
    /// ```
    ///
    /// i128 intermediates prevent overflow on large invoices.
    ///
    /// ## Example
    /// ```rust
    /// use billforge_core::money::Money;
    /// use billforge_core::types::GstRate;
    ///
    /// let subtotal = Money::from_paise(150_000); // ₹1500.00
    /// let rate = GstRate::from_bps(1800);        // 18%
    ///
    /// let half = subtotal.gst_half(rate);
    /// assert_eq!(half.paise(), 13_500);          // ₹135.00 CGST (or SGST)
    /// ```
    pub fn gst_half(&self, rate: GstRate) -> Money {
        let half = (self.0 as i128 * rate.bps() as i128 + 10_000) / 20_000;
        Money::from_paise(half as i64)
    }

    /// Splits the GST due on this amount into its CGST and SGST
    /// halves. The halves are always equal by construction.
    pub fn gst_split(&self, rate: GstRate) -> (Money, Money) {
        let half = self.gst_half(rate);
        (half, half)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs; rendering layers format for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
    }

    #[test]
    fn test_gst_half_exact() {
        // ₹1500.00 at 18% GST: each half is 9%, exactly ₹135.00
        let subtotal = Money::from_rupees(1500);
        let rate = GstRate::from_bps(1800);
        assert_eq!(subtotal.gst_half(rate).paise(), 13_500);
    }

    #[test]
    fn test_gst_half_rounds_half_up() {
        // ₹0.01 at 18%: half is 0.0009 paise... scaled: (1*1800+10000)/20000 = 0
        assert_eq!(Money::from_paise(1).gst_half(GstRate::from_bps(1800)).paise(), 0);

        // ₹1.11 at 18%: 111 * 900 bps = 9.99 paise → 10 (half-up)
        assert_eq!(
            Money::from_paise(111).gst_half(GstRate::from_bps(1800)).paise(),
            10
        );

        // Exact .5 paisa rounds up: 50 paise at 10% → half = 2.5 → 3
        assert_eq!(Money::from_paise(50).gst_half(GstRate::from_bps(1000)).paise(), 3);
    }

    #[test]
    fn test_gst_split_halves_are_equal() {
        let subtotal = Money::from_paise(123_457);
        let (cgst, sgst) = subtotal.gst_split(GstRate::from_bps(1800));
        assert_eq!(cgst, sgst);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_paise(299);
        assert_eq!(unit_price.multiply_quantity(3).paise(), 897);
    }

    /// ₹10.00 / 3 × 3 loses one paisa; the loss is explicit, never
    /// hidden in float noise.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_paise(1000);
        let one_third = Money::from_paise(1000 / 3);
        let reconstructed = one_third * 3;

        assert_eq!(reconstructed.paise(), 999);
        assert_eq!((ten - reconstructed).paise(), 1);
    }
}
