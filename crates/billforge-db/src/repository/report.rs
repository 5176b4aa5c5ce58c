//! # Report Repository
//!
//! Read-only aggregate queries over committed invoices and stock.
//!
//! ## Read Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Reports never mutate. They read committed state and may        │
//! │  observe a slightly stale snapshot while writers are active;    │
//! │  they never see a half-committed invoice (SQLite transactions   │
//! │  are all-or-nothing to readers).                                │
//! │                                                                 │
//! │  Committed totals are frozen, so a report over a closed period  │
//! │  is reproducible forever.                                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Revenue sums the frozen `total_cents`; profit joins items back to
//! the catalog's `cost_price_cents`, so profit reflects the current
//! recorded cost, not a cost snapshot.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::DbResult;

// =============================================================================
// Periods
// =============================================================================

/// Time window for report queries, evaluated against invoice
/// `created_at` timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Everything ever recorded.
    All,
    /// Since midnight UTC today.
    Daily,
    /// The trailing 7 days.
    Weekly,
    /// Since the first of the current month (UTC).
    Monthly,
    /// Explicit inclusive range.
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl Period {
    /// Resolves the period to concrete inclusive bounds, or `None`
    /// for [`Period::All`].
    fn bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match *self {
            Period::All => None,
            Period::Daily => {
                let start = Utc
                    .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                Some((start, now))
            }
            Period::Weekly => Some((now - Duration::days(7), now)),
            Period::Monthly => {
                let start = Utc
                    .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                    .single()
                    .unwrap_or(now);
                Some((start, now))
            }
            Period::Range { from, to } => Some((from, to)),
        }
    }
}

// =============================================================================
// Read Models
// =============================================================================

/// High-level business summary for a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub invoice_count: i64,
    pub revenue_cents: i64,
    pub units_sold: i64,
    pub unique_customers: i64,
    /// Profit over the period: Σ (line_total − cost_price × qty).
    pub profit_cents: i64,
    /// Current damaged stock across the whole catalog (not
    /// period-scoped; damage is a present-state fact).
    pub damaged_units: i64,
    pub damaged_value_cents: i64,
}

/// Per-product sales aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSales {
    pub product_id: String,
    pub full_name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// A product currently holding damaged stock.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DamagedProduct {
    pub product_id: String,
    pub full_name: String,
    pub damaged_quantity: i64,
    /// `damaged_quantity * cost_price_cents`.
    pub value_lost_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Business summary over a period.
    pub async fn summary(&self, period: Period) -> DbResult<SummaryReport> {
        let bounds = period.bounds(Utc::now());

        let (invoice_count, revenue, customers): (i64, Option<i64>, i64) = match bounds {
            Some((from, to)) => {
                sqlx::query_as(
                    r#"
                    SELECT COUNT(*), SUM(total_cents), COUNT(DISTINCT customer_name)
                    FROM invoices
                    WHERE created_at >= ?1 AND created_at <= ?2
                    "#,
                )
                .bind(from)
                .bind(to)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT COUNT(*), SUM(total_cents), COUNT(DISTINCT customer_name) FROM invoices",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };

        let (units_sold, profit): (Option<i64>, Option<i64>) = match bounds {
            Some((from, to)) => {
                sqlx::query_as(
                    r#"
                    SELECT
                        SUM(ii.quantity),
                        SUM(ii.line_total_cents - p.cost_price_cents * ii.quantity)
                    FROM invoice_items ii
                    JOIN invoices i ON i.id = ii.invoice_id
                    JOIN products p ON p.id = ii.product_id
                    WHERE i.created_at >= ?1 AND i.created_at <= ?2
                    "#,
                )
                .bind(from)
                .bind(to)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT
                        SUM(ii.quantity),
                        SUM(ii.line_total_cents - p.cost_price_cents * ii.quantity)
                    FROM invoice_items ii
                    JOIN products p ON p.id = ii.product_id
                    "#,
                )
                .fetch_one(&self.pool)
                .await?
            }
        };

        let (damaged_units, damaged_value): (Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT SUM(damaged_quantity), SUM(damaged_quantity * cost_price_cents)
            FROM products
            WHERE damaged_quantity > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SummaryReport {
            invoice_count,
            revenue_cents: revenue.unwrap_or(0),
            units_sold: units_sold.unwrap_or(0),
            unique_customers: customers,
            profit_cents: profit.unwrap_or(0),
            damaged_units: damaged_units.unwrap_or(0),
            damaged_value_cents: damaged_value.unwrap_or(0),
        })
    }

    /// Per-product quantity and revenue over a period, highest
    /// revenue first.
    pub async fn sales_by_product(&self, period: Period) -> DbResult<Vec<ProductSales>> {
        self.product_sales(period, None).await
    }

    /// Best sellers by units sold over a period.
    pub async fn top_selling(&self, period: Period, limit: u32) -> DbResult<Vec<ProductSales>> {
        self.product_sales(period, Some(limit)).await
    }

    async fn product_sales(
        &self,
        period: Period,
        limit: Option<u32>,
    ) -> DbResult<Vec<ProductSales>> {
        let bounds = period.bounds(Utc::now());

        // Group by product, name from the snapshot so soft-deleted
        // or renamed products still report under what was sold.
        let filter = if bounds.is_some() {
            "WHERE i.created_at >= ?1 AND i.created_at <= ?2"
        } else {
            ""
        };
        let order = if limit.is_some() {
            "ORDER BY units_sold DESC"
        } else {
            "ORDER BY revenue_cents DESC"
        };
        let limit_clause = match (limit.is_some(), bounds.is_some()) {
            (true, true) => "LIMIT ?3",
            (true, false) => "LIMIT ?1",
            (false, _) => "",
        };

        let sql = format!(
            r#"
            SELECT
                ii.product_id AS product_id,
                CASE WHEN ii.weight_snapshot IS NULL
                     THEN ii.name_snapshot
                     ELSE ii.name_snapshot || ' (' || ii.weight_snapshot || ')'
                END AS full_name,
                SUM(ii.quantity) AS units_sold,
                SUM(ii.line_total_cents) AS revenue_cents
            FROM invoice_items ii
            JOIN invoices i ON i.id = ii.invoice_id
            {filter}
            GROUP BY ii.product_id, full_name
            {order}
            {limit_clause}
            "#
        );

        let mut query = sqlx::query_as::<_, ProductSales>(&sql);
        if let Some((from, to)) = bounds {
            query = query.bind(from).bind(to);
        }
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Products currently holding damaged stock, biggest loss first.
    pub async fn damaged_products(&self) -> DbResult<Vec<DamagedProduct>> {
        let rows = sqlx::query_as::<_, DamagedProduct>(
            r#"
            SELECT
                id AS product_id,
                full_name,
                damaged_quantity,
                damaged_quantity * cost_price_cents AS value_lost_cents
            FROM products
            WHERE damaged_quantity > 0
            ORDER BY value_lost_cents DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_database;
    use billforge_core::types::{Customer, GstRate, InvoiceRequestLine, NewProduct, ProductKey};

    const GST_18: GstRate = GstRate::from_bps(1800);

    async fn seed_catalog(db: &crate::pool::Database) {
        let catalog = db.catalog();
        catalog
            .create(&NewProduct {
                key: ProductKey::new("Rice", Some("5kg")),
                quantity: 20,
                cost_price_cents: 40_000,
                selling_price_cents: 50_000,
            })
            .await
            .unwrap();
        catalog
            .create(&NewProduct {
                key: ProductKey::new("Sugar", None),
                quantity: 50,
                cost_price_cents: 3_000,
                selling_price_cents: 4_500,
            })
            .await
            .unwrap();
    }

    fn line(name: &str, weight: Option<&str>, qty: i64) -> InvoiceRequestLine {
        InvoiceRequestLine::new(ProductKey::new(name, weight), qty)
    }

    #[tokio::test]
    async fn test_summary_reconciles_with_committed_invoices() {
        let db = test_database().await;
        seed_catalog(&db).await;

        let invoices = db.invoices(GST_18);
        let first = invoices
            .create(&Customer::named("Asha"), &[line("Rice", Some("5kg"), 3)])
            .await
            .unwrap();
        let second = invoices
            .create(
                &Customer::named("Bilal"),
                &[line("Sugar", None, 10), line("Rice", Some("5kg"), 1)],
            )
            .await
            .unwrap();

        let summary = db.reports().summary(Period::All).await.unwrap();

        assert_eq!(summary.invoice_count, 2);
        assert_eq!(
            summary.revenue_cents,
            first.invoice.total_cents + second.invoice.total_cents
        );
        assert_eq!(summary.units_sold, 14);
        assert_eq!(summary.unique_customers, 2);
        // Rice margin 100.00 × 4 units + Sugar margin 15.00 × 10
        assert_eq!(summary.profit_cents, 4 * 10_000 + 10 * 1_500);
        assert_eq!(summary.damaged_units, 0);
    }

    #[tokio::test]
    async fn test_summary_counts_damaged_value() {
        let db = test_database().await;
        seed_catalog(&db).await;

        let rice = db
            .catalog()
            .get_by_full_name("Rice (5kg)")
            .await
            .unwrap()
            .unwrap();
        db.damage().mark_damaged(&rice.id, 3).await.unwrap();

        let summary = db.reports().summary(Period::All).await.unwrap();
        assert_eq!(summary.damaged_units, 3);
        assert_eq!(summary.damaged_value_cents, 3 * 40_000);

        let damaged = db.reports().damaged_products().await.unwrap();
        assert_eq!(damaged.len(), 1);
        assert_eq!(damaged[0].full_name, "Rice (5kg)");
        assert_eq!(damaged[0].value_lost_cents, 120_000);
    }

    #[tokio::test]
    async fn test_top_selling_orders_by_units() {
        let db = test_database().await;
        seed_catalog(&db).await;

        let invoices = db.invoices(GST_18);
        invoices
            .create(&Customer::named("Asha"), &[line("Sugar", None, 12)])
            .await
            .unwrap();
        invoices
            .create(&Customer::named("Bilal"), &[line("Rice", Some("5kg"), 2)])
            .await
            .unwrap();

        let top = db.reports().top_selling(Period::All, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].full_name, "Sugar");
        assert_eq!(top[0].units_sold, 12);

        let by_revenue = db.reports().sales_by_product(Period::All).await.unwrap();
        // Rice revenue 1000.00 beats Sugar's 540.00
        assert_eq!(by_revenue[0].full_name, "Rice (5kg)");
    }

    #[tokio::test]
    async fn test_daily_period_includes_todays_invoices() {
        let db = test_database().await;
        seed_catalog(&db).await;

        db.invoices(GST_18)
            .create(&Customer::named("Asha"), &[line("Rice", Some("5kg"), 1)])
            .await
            .unwrap();

        for period in [Period::Daily, Period::Weekly, Period::Monthly] {
            let summary = db.reports().summary(period).await.unwrap();
            assert_eq!(summary.invoice_count, 1, "period {period:?}");
        }

        // A range entirely in the past sees nothing
        let past = Period::Range {
            from: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap(),
        };
        let summary = db.reports().summary(past).await.unwrap();
        assert_eq!(summary.invoice_count, 0);
        assert_eq!(summary.revenue_cents, 0);
    }

    /// Read models serialize cleanly for downstream renderers.
    #[tokio::test]
    async fn test_summary_serializes_to_json() {
        let db = test_database().await;

        let summary = db.reports().summary(Period::All).await.unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["invoice_count"], 0);
        assert_eq!(json["revenue_cents"], 0);
    }

    #[tokio::test]
    async fn test_empty_database_summary_is_all_zero() {
        let db = test_database().await;

        let summary = db.reports().summary(Period::All).await.unwrap();
        assert_eq!(summary.invoice_count, 0);
        assert_eq!(summary.revenue_cents, 0);
        assert_eq!(summary.units_sold, 0);
        assert_eq!(summary.profit_cents, 0);
    }
}
