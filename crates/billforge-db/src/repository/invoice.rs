//! # Invoice Repository
//!
//! Atomic invoice creation and invoice reads.
//!
//! ## Creation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Invoice Creation                             │
//! │                                                                 │
//! │  1. VALIDATE (pure)                                             │
//! │     └── customer, line count, quantities                        │
//! │         fails here → no number burned, no stock touched         │
//! │                                                                 │
//! │  2. RESOLVE + PRE-CHECK (pool reads)                            │
//! │     └── look up each product, freeze unit prices,               │
//! │         reject the whole invoice on the first shortfall         │
//! │                                                                 │
//! │  3. ALLOCATE NUMBER (independent commit)                        │
//! │     └── sequencer bump; burned if a later step fails            │
//! │                                                                 │
//! │  4. RESERVE + PERSIST (one transaction, writes only)            │
//! │     ├── guarded decrement per product:                          │
//! │     │     UPDATE products SET quantity = quantity - ?           │
//! │     │     WHERE id = ? AND quantity >= ?                        │
//! │     ├── guard miss → rollback, revalidate, retry ONCE           │
//! │     ├── INSERT invoice header (frozen totals)                   │
//! │     └── INSERT items in request order (snapshots)               │
//! │                                                                 │
//! │  All-or-nothing: a failure anywhere in step 4 rolls back every  │
//! │  decrement and every row of this invoice.                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transaction in step 4 contains only writes. All reads happen
//! on the pool beforehand, so the transaction takes SQLite's write
//! lock on its first statement and never deadlocks upgrading a read.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use billforge_core::pricing::{InvoiceTotals, LineQuote};
use billforge_core::types::{
    CreatedInvoice, Customer, GstRate, Invoice, InvoiceItem, InvoiceRequestLine, Product,
};
use billforge_core::validation::validate_invoice_request;
use billforge_core::CoreError;

use crate::error::{BillingError, BillingResult, DbResult};
use crate::repository::catalog::ProductCatalog;
use crate::repository::sequence::InvoiceSequencer;

/// Repository for invoice creation and reads.
///
/// Bound to the configured GST rate at construction; the rate is
/// frozen onto each invoice it creates.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    gst_rate: GstRate,
}

/// A request line after product resolution: the catalog row and the
/// priced quote, still in request order.
struct ResolvedLine {
    product: Product,
    quantity: i64,
    quote: LineQuote,
}

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number,
    customer_name, customer_phone, customer_address,
    subtotal_cents, cgst_cents, sgst_cents, total_cents,
    gst_rate_bps, created_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, invoice_id, product_id,
    name_snapshot, weight_snapshot,
    quantity, unit_price_cents, line_total_cents,
    position, created_at
"#;

impl InvoiceRepository {
    /// Creates a new InvoiceRepository bound to a GST rate.
    pub fn new(pool: SqlitePool, gst_rate: GstRate) -> Self {
        InvoiceRepository { pool, gst_rate }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an invoice: validates, reserves stock, and persists
    /// the header and items atomically.
    ///
    /// ## Returns
    /// * `Ok(CreatedInvoice)` - Committed invoice with its items
    /// * `Err(BillingError::Domain(_))` - Request rejected; nothing
    ///   was mutated (except a possibly burned invoice number)
    /// * `Err(BillingError::Db(_))` - Infrastructure failure; the
    ///   reserve/persist transaction rolled back
    pub async fn create(
        &self,
        customer: &Customer,
        lines: &[InvoiceRequestLine],
    ) -> BillingResult<CreatedInvoice> {
        // Step 1: pure validation. Failures here burn nothing.
        validate_invoice_request(customer, lines).map_err(BillingError::Domain)?;

        // Step 2: resolve products and freeze prices.
        let catalog = ProductCatalog::new(self.pool.clone());
        let resolved = self.resolve_lines(&catalog, lines).await?;
        Self::check_availability(&resolved)?;

        // Step 3: allocate the number. Commits independently; if
        // anything below fails the number is burned, never reissued.
        let invoice_number = InvoiceSequencer::new(self.pool.clone()).next().await?;

        // Step 4: reserve + persist, retrying once on a guard miss.
        match self.attempt_commit(invoice_number, customer, &resolved).await? {
            Ok(created) => {
                info!(
                    invoice_number = created.invoice.invoice_number,
                    total_cents = created.invoice.total_cents,
                    items = created.items.len(),
                    "Invoice committed"
                );
                Ok(created)
            }
            Err(contested) => {
                warn!(
                    invoice_number,
                    full_name = %contested,
                    "Stock guard miss, revalidating"
                );

                // A concurrent writer took the stock between our
                // pre-check and the guarded UPDATE. Revalidate
                // against fresh stock: a real shortfall surfaces as
                // InsufficientStock, otherwise retry once with the
                // same (already committed) number.
                let resolved = self.resolve_lines(&catalog, lines).await?;
                Self::check_availability(&resolved)?;

                match self.attempt_commit(invoice_number, customer, &resolved).await? {
                    Ok(created) => Ok(created),
                    Err(contested) => Err(BillingError::Domain(CoreError::Conflict {
                        full_name: contested,
                    })),
                }
            }
        }
    }

    /// Resolves request lines to catalog rows with frozen prices.
    async fn resolve_lines(
        &self,
        catalog: &ProductCatalog,
        lines: &[InvoiceRequestLine],
    ) -> BillingResult<Vec<ResolvedLine>> {
        let mut resolved = Vec::with_capacity(lines.len());

        for line in lines {
            let product = catalog.resolve(&line.key).await?;
            let quote = LineQuote::price(product.selling_price(), line.quantity);
            resolved.push(ResolvedLine {
                product,
                quantity: line.quantity,
                quote,
            });
        }

        Ok(resolved)
    }

    /// Rejects the whole invoice on the first shortfall. Repeated
    /// lines for the same product are summed before comparison.
    fn check_availability(resolved: &[ResolvedLine]) -> BillingResult<()> {
        let mut requested: HashMap<&str, i64> = HashMap::new();
        for line in resolved {
            *requested.entry(line.product.id.as_str()).or_default() += line.quantity;
        }

        for line in resolved {
            let total = requested[line.product.id.as_str()];
            if line.product.quantity < total {
                return Err(BillingError::Domain(CoreError::InsufficientStock {
                    full_name: line.product.full_name.clone(),
                    available: line.product.quantity,
                    requested: total,
                }));
            }
        }

        Ok(())
    }

    /// One reserve + persist attempt inside a single transaction.
    ///
    /// ## Returns
    /// * `Ok(Ok(created))` - Committed
    /// * `Ok(Err(full_name))` - Guard miss on this product; the
    ///   transaction was rolled back, caller decides whether to retry
    /// * `Err(_)` - Infrastructure failure, rolled back
    async fn attempt_commit(
        &self,
        invoice_number: i64,
        customer: &Customer,
        resolved: &[ResolvedLine],
    ) -> BillingResult<Result<CreatedInvoice, String>> {
        let now = Utc::now();

        // Aggregate per product so repeated lines issue one guarded
        // decrement for their combined quantity.
        let mut decrements: Vec<(&Product, i64)> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for line in resolved {
            match seen.get(line.product.id.as_str()) {
                Some(&idx) => decrements[idx].1 += line.quantity,
                None => {
                    seen.insert(line.product.id.as_str(), decrements.len());
                    decrements.push((&line.product, line.quantity));
                }
            }
        }

        let mut tx = self.pool.begin().await.map_err(crate::error::DbError::from)?;

        for (product, quantity) in &decrements {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(&product.id)
            .bind(*quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(crate::error::DbError::from)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(crate::error::DbError::from)?;
                return Ok(Err(product.full_name.clone()));
            }
        }

        let quotes: Vec<LineQuote> = resolved.iter().map(|l| l.quote).collect();
        let totals = InvoiceTotals::compute(&quotes, self.gst_rate);

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            customer_name: customer.name.trim().to_string(),
            customer_phone: customer.phone.as_deref().map(|p| p.trim().to_string()),
            customer_address: customer.address.as_deref().map(|a| a.trim().to_string()),
            subtotal_cents: totals.subtotal.paise(),
            cgst_cents: totals.cgst.paise(),
            sgst_cents: totals.sgst.paise(),
            total_cents: totals.total.paise(),
            gst_rate_bps: self.gst_rate.bps(),
            created_at: now,
        };

        debug!(invoice_number, "Inserting invoice header");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number,
                customer_name, customer_phone, customer_address,
                subtotal_cents, cgst_cents, sgst_cents, total_cents,
                gst_rate_bps, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&invoice.id)
        .bind(invoice.invoice_number)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_phone)
        .bind(&invoice.customer_address)
        .bind(invoice.subtotal_cents)
        .bind(invoice.cgst_cents)
        .bind(invoice.sgst_cents)
        .bind(invoice.total_cents)
        .bind(invoice.gst_rate_bps)
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await
        .map_err(crate::error::DbError::from)?;

        let mut items = Vec::with_capacity(resolved.len());
        for (position, line) in resolved.iter().enumerate() {
            let item = InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice.id.clone(),
                product_id: line.product.id.clone(),
                name_snapshot: line.product.name.clone(),
                weight_snapshot: line.product.weight.clone(),
                quantity: line.quantity,
                unit_price_cents: line.quote.unit_price.paise(),
                line_total_cents: line.quote.line_total.paise(),
                position: position as i64,
                created_at: now,
            };

            Self::insert_item(&mut tx, &item).await?;
            items.push(item);
        }

        tx.commit().await.map_err(crate::error::DbError::from)?;

        Ok(Ok(CreatedInvoice { invoice, items }))
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Sqlite>,
        item: &InvoiceItem,
    ) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, product_id,
                name_snapshot, weight_snapshot,
                quantity, unit_price_cents, line_total_cents,
                position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.invoice_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(&item.weight_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_total_cents)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&mut **tx)
        .await
        .map_err(crate::error::DbError::from)?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice with its items by business number.
    pub async fn get_by_number(&self, invoice_number: i64) -> DbResult<Option<CreatedInvoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        match invoice {
            Some(invoice) => {
                let items = self.get_items(&invoice.id).await?;
                Ok(Some(CreatedInvoice { invoice, items }))
            }
            None => Ok(None),
        }
    }

    /// Gets an invoice with its items by UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CreatedInvoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match invoice {
            Some(invoice) => {
                let items = self.get_items(&invoice.id).await?;
                Ok(Some(CreatedInvoice { invoice, items }))
            }
            None => Ok(None),
        }
    }

    /// Lists recent invoice headers, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY invoice_number DESC LIMIT ?1"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    /// Gets all items for an invoice, in request order.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ?1 ORDER BY position"
        );
        let items = sqlx::query_as::<_, InvoiceItem>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
