//! # billforge-core: Pure Business Logic for billforge
//!
//! This crate is the **heart** of billforge. It contains all billing
//! and stock business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        billforge Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │         Callers (HTTP layer, CLI, PDF/CSV renderers)            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │              ★ billforge-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│    │    │
//! │  │   │  Product  │  │   Money   │  │ LineQuote │  │   rules   │    │    │
//! │  │   │  Invoice  │  │  GST calc │  │  Totals   │  │   checks  │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                   billforge-db (Database Layer)                 │    │
//! │  │       SQLite queries, migrations, repositories, sequencer       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, DamageEvent, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Line pricing and invoice totals with the GST split
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use billforge_core::money::Money;
//! use billforge_core::pricing::{InvoiceTotals, LineQuote};
//! use billforge_core::types::GstRate;
//!
//! // Price from paise (never from floats!)
//! let unit_price = Money::from_rupees(500); // ₹500.00
//!
//! // 3 units at 18% GST
//! let lines = vec![LineQuote::price(unit_price, 3)];
//! let totals = InvoiceTotals::compute(&lines, GstRate::from_bps(1800));
//!
//! assert_eq!(totals.subtotal.paise(), 150_000); // ₹1500.00
//! assert_eq!(totals.cgst.paise(), 13_500);      // ₹135.00
//! assert_eq!(totals.sgst.paise(), 13_500);      // ₹135.00
//! assert_eq!(totals.total.paise(), 177_000);    // ₹1770.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use billforge_core::Money` instead of
// `use billforge_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{InvoiceTotals, LineQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single invoice.
///
/// ## Business Reason
/// Keeps invoices printable on one page and transactions a sane
/// size. Can be made configurable in future versions.
pub const MAX_INVOICE_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead
/// of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum price per unit, in paise (₹10 crore).
///
/// ## Business Reason
/// No single catalog item costs more than this; the cap also keeps
/// `price × MAX_LINE_QUANTITY` far inside i64 range, so line totals
/// never overflow.
pub const MAX_PRICE_PAISE: i64 = 10_000_000_000;
