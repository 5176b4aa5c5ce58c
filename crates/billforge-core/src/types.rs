//! # Domain Types
//!
//! Core domain types used throughout billforge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐       │
//! │  │   Product    │  │   Invoice    │  │   InvoiceItem    │       │
//! │  │ ──────────── │  │ ──────────── │  │ ──────────────── │       │
//! │  │ id (UUID)    │  │ id (UUID)    │  │ id (UUID)        │       │
//! │  │ (name,weight)│  │ invoice_no   │  │ invoice_id (FK)  │       │
//! │  │ quantity     │  │ totals       │  │ price snapshot   │       │
//! │  │ damaged_qty  │  │ customer     │  │ quantity         │       │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘       │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐       │
//! │  │   GstRate    │  │  ProductKey  │  │   DamageEvent    │       │
//! │  │  bps (u32)   │  │ name+weight  │  │ damaged/restored │       │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key: `(name, weight)` for products, `invoice_number`
//!   for invoices - human-readable, what callers pass around

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1800 bps = 18% GST, split into
/// 900 bps CGST + 900 bps SGST. Integer bps keep the tax math exact.
///
/// The rate is external configuration: nothing in this crate
/// hardcodes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate.
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

// =============================================================================
// Product Key
// =============================================================================

/// Business identity of a product: name plus optional weight/size
/// variant. `"Rice"` and `"Rice (5kg)"` are different products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    pub name: String,
    pub weight: Option<String>,
}

impl ProductKey {
    /// Creates a key from a name and an optional weight variant.
    /// Blank weights are normalized to `None`.
    pub fn new(name: impl Into<String>, weight: Option<&str>) -> Self {
        let weight = weight
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string);
        ProductKey {
            name: name.into().trim().to_string(),
            weight,
        }
    }

    /// The derived display/lookup name: `"Rice (5kg)"` or `"Rice"`.
    ///
    /// Derived, never independently authoritative: it is always
    /// recomputed from `(name, weight)`.
    pub fn full_name(&self) -> String {
        match &self.weight {
            Some(w) => format!("{} ({})", self.name, w),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product held in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product name (business key, with `weight`).
    pub name: String,

    /// Weight/size variant, e.g. "5kg"; `None` for single-variant
    /// products.
    pub weight: Option<String>,

    /// Derived `"name (weight)"` concatenation; UNIQUE in storage,
    /// used as the human-facing lookup key.
    pub full_name: String,

    /// Sellable stock. Never negative.
    pub quantity: i64,

    /// Stock held but excluded from sale. Never negative.
    pub damaged_quantity: i64,

    /// Purchase cost in paise (for profit reporting).
    pub cost_price_cents: i64,

    /// Selling price in paise; snapshotted onto invoice items at
    /// sale time.
    pub selling_price_cents: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the business key.
    pub fn key(&self) -> ProductKey {
        ProductKey {
            name: self.name.clone(),
            weight: self.weight.clone(),
        }
    }

    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_paise(self.selling_price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_paise(self.cost_price_cents)
    }

    /// Checks whether `quantity` units can be sold from sellable
    /// stock. Damaged stock never counts toward availability.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// Total physical units held: sellable + damaged. Conserved
    /// across damage/restore operations.
    pub fn total_units(&self) -> i64 {
        self.quantity + self.damaged_quantity
    }
}

/// Fields for creating a new catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub key: ProductKey,
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
}

/// Administrative field corrections; `None` leaves a field untouched.
/// This path mutates absolute values directly and bypasses
/// reservation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub quantity: Option<i64>,
    pub cost_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
}

// =============================================================================
// Customer
// =============================================================================

/// Free-text customer details captured on an invoice. Only the name
/// is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    pub fn named(name: impl Into<String>) -> Self {
        Customer {
            name: name.into(),
            phone: None,
            address: None,
        }
    }
}

// =============================================================================
// Invoice Request
// =============================================================================

/// One requested line of an invoice: which product, how many units.
/// Order is preserved through to the persisted items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequestLine {
    pub key: ProductKey,
    pub quantity: i64,
}

impl InvoiceRequestLine {
    pub fn new(key: ProductKey, quantity: i64) -> Self {
        InvoiceRequestLine { key, quantity }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A committed invoice header. Totals are derived from the items at
/// creation time and frozen thereafter; later price changes never
/// touch them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    /// Sequential business number; unique, never reused even when a
    /// later transaction aborts (gaps allowed, duplicates never).
    pub invoice_number: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub subtotal_cents: i64,
    pub cgst_cents: i64,
    pub sgst_cents: i64,
    pub total_cents: i64,
    /// The configured GST rate the totals were computed with, frozen
    /// alongside them.
    pub gst_rate_bps: u32,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_cents)
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item in a committed invoice.
/// Uses the snapshot pattern to freeze product data at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Weight variant at time of sale (frozen).
    pub weight_snapshot: Option<String>,
    /// Units sold.
    pub quantity: i64,
    /// Unit price in paise at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total before tax (unit_price × quantity), exact.
    pub line_total_cents: i64,
    /// Insertion order = display order.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl InvoiceItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_cents)
    }

    /// The frozen display name of the product sold.
    pub fn full_name(&self) -> String {
        match &self.weight_snapshot {
            Some(w) => format!("{} ({})", self.name_snapshot, w),
            None => self.name_snapshot.clone(),
        }
    }
}

/// A fully materialized, committed invoice: header plus ordered
/// items. What `create` hands back for downstream rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

// =============================================================================
// Damage Ledger
// =============================================================================

/// Direction of a damaged-stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DamageKind {
    /// Units moved from sellable to damaged stock.
    Damaged,
    /// Units moved back from damaged to sellable stock.
    Restored,
}

/// One recorded damage/restore event. Total physical stock is
/// conserved by every event: units move between the two columns,
/// none are created or destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DamageEvent {
    pub id: String,
    pub product_id: String,
    pub kind: DamageKind,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_rate_from_bps() {
        let rate = GstRate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_gst_rate_from_percentage() {
        assert_eq!(GstRate::from_percentage(18.0).bps(), 1800);
        assert_eq!(GstRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_product_key_full_name() {
        let key = ProductKey::new("Rice", Some("5kg"));
        assert_eq!(key.full_name(), "Rice (5kg)");

        let bare = ProductKey::new("Rice", None);
        assert_eq!(bare.full_name(), "Rice");

        // Blank weight is the same as no weight
        let blank = ProductKey::new("Rice", Some("  "));
        assert_eq!(blank, bare);
    }

    #[test]
    fn test_total_units_conservation_view() {
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            name: "Rice".to_string(),
            weight: Some("5kg".to_string()),
            full_name: "Rice (5kg)".to_string(),
            quantity: 7,
            damaged_quantity: 3,
            cost_price_cents: 40_000,
            selling_price_cents: 50_000,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(product.total_units(), 10);
        assert!(product.can_sell(7));
        assert!(!product.can_sell(8)); // damaged units never sellable
    }
}
