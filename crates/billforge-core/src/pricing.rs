//! # Pricing Module
//!
//! Pure invoice pricing: line totals, subtotal, and the CGST/SGST
//! split. No I/O - the caller resolves products and hands in frozen
//! unit prices; this module only does arithmetic.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  (unit_price, quantity) per line                                │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  line_total = unit_price × quantity        (exact, no rounding) │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  subtotal = Σ line_total                   (exact, no rounding) │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  cgst = sgst = round_half_up(subtotal × rate / 2)   (one round) │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  total = subtotal + cgst + sgst                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rounding happens exactly once, at the GST halves. Everything
//! upstream is exact integer paise, so `total` always reconciles
//! with its parts.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::GstRate;

// =============================================================================
// Line Quote
// =============================================================================

/// The priced form of one invoice line: the frozen unit price and
/// the exact pre-tax line total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineQuote {
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

impl LineQuote {
    /// Prices one line. The multiplication is exact in paise.
    pub fn price(unit_price: Money, quantity: i64) -> Self {
        LineQuote {
            unit_price,
            quantity,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// The complete money summary of an invoice.
///
/// Invariant: `total = subtotal + cgst + sgst`, and `cgst == sgst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Computes totals for a set of priced lines at the given rate.
    pub fn compute(lines: &[LineQuote], rate: GstRate) -> Self {
        let subtotal = lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total);
        Self::from_subtotal(subtotal, rate)
    }

    /// Computes totals from an already-summed subtotal.
    pub fn from_subtotal(subtotal: Money, rate: GstRate) -> Self {
        let (cgst, sgst) = subtotal.gst_split(rate);
        InvoiceTotals {
            subtotal,
            cgst,
            sgst,
            total: subtotal + cgst + sgst,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_quote_is_exact() {
        // 3 × ₹500.00 = ₹1500.00, no rounding involved
        let line = LineQuote::price(Money::from_rupees(500), 3);
        assert_eq!(line.line_total.paise(), 150_000);
    }

    /// 3 units of a ₹500.00 product at 18% GST:
    /// subtotal 1500.00, CGST 135.00, SGST 135.00, total 1770.00.
    #[test]
    fn test_single_line_invoice_totals() {
        let lines = vec![LineQuote::price(Money::from_rupees(500), 3)];
        let totals = InvoiceTotals::compute(&lines, GstRate::from_bps(1800));

        assert_eq!(totals.subtotal.paise(), 150_000);
        assert_eq!(totals.cgst.paise(), 13_500);
        assert_eq!(totals.sgst.paise(), 13_500);
        assert_eq!(totals.total.paise(), 177_000);
    }

    #[test]
    fn test_multi_line_invoice_totals() {
        let lines = vec![
            LineQuote::price(Money::from_paise(29_900), 2), // ₹598.00
            LineQuote::price(Money::from_paise(12_550), 1), // ₹125.50
        ];
        let totals = InvoiceTotals::compute(&lines, GstRate::from_bps(1800));

        assert_eq!(totals.subtotal.paise(), 72_350);
        // 72350 × 900bps = 6511.5 paise → 6512 half-up, per half
        assert_eq!(totals.cgst.paise(), 6_512);
        assert_eq!(totals.sgst.paise(), 6_512);
        assert_eq!(totals.total.paise(), 85_374);
    }

    #[test]
    fn test_totals_reconcile() {
        let lines = vec![
            LineQuote::price(Money::from_paise(1), 1),
            LineQuote::price(Money::from_paise(333), 7),
        ];
        let totals = InvoiceTotals::compute(&lines, GstRate::from_bps(1800));

        assert_eq!(totals.total, totals.subtotal + totals.cgst + totals.sgst);
        assert_eq!(totals.cgst, totals.sgst);
    }

    #[test]
    fn test_zero_rate_collects_no_tax() {
        let lines = vec![LineQuote::price(Money::from_rupees(100), 5)];
        let totals = InvoiceTotals::compute(&lines, GstRate::zero());

        assert!(totals.cgst.is_zero());
        assert!(totals.sgst.is_zero());
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_empty_lines_are_all_zero() {
        let totals = InvoiceTotals::compute(&[], GstRate::from_bps(1800));
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());
    }
}
