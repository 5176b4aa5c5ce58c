//! # Damaged-Stock Ledger
//!
//! Moves units between sellable and damaged stock, and records each
//! move as an event.
//!
//! ## Conservation Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  quantity + damaged_quantity is constant across every move:     │
//! │                                                                 │
//! │  mark_damaged(3):   quantity -= 3,  damaged_quantity += 3       │
//! │  restore(2):        quantity += 2,  damaged_quantity -= 2       │
//! │                                                                 │
//! │  One guarded UPDATE does both column changes, so the pair can   │
//! │  never half-apply. The guard (source column >= moved amount)    │
//! │  is checked in the same statement.                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Damaged units are invisible to invoice availability; only the
//! `quantity` column counts toward a sale.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use billforge_core::types::{DamageEvent, DamageKind, ProductKey};
use billforge_core::validation::validate_quantity;
use billforge_core::CoreError;

use crate::error::{BillingError, BillingResult, DbError, DbResult};
use crate::repository::catalog::ProductCatalog;

/// Repository for damaged-stock moves and their event history.
#[derive(Debug, Clone)]
pub struct DamageLedger {
    pool: SqlitePool,
}

impl DamageLedger {
    /// Creates a new DamageLedger.
    pub fn new(pool: SqlitePool) -> Self {
        DamageLedger { pool }
    }

    /// Moves `quantity` units from sellable to damaged stock.
    ///
    /// ## Returns
    /// * `Err(BillingError::Domain(InsufficientStock))` - Fewer than
    ///   `quantity` sellable units exist; nothing moved
    pub async fn mark_damaged(&self, product_id: &str, quantity: i64) -> BillingResult<DamageEvent> {
        self.move_stock(product_id, quantity, DamageKind::Damaged)
            .await
    }

    /// Moves `quantity` units back from damaged to sellable stock.
    ///
    /// ## Returns
    /// * `Err(BillingError::Domain(InsufficientDamagedStock))` -
    ///   Fewer than `quantity` damaged units exist; nothing moved
    pub async fn restore(&self, product_id: &str, quantity: i64) -> BillingResult<DamageEvent> {
        self.move_stock(product_id, quantity, DamageKind::Restored)
            .await
    }

    /// [`Self::mark_damaged`] addressed by business key instead of
    /// UUID. Fails with `UnknownProduct` for missing or soft-deleted
    /// products.
    pub async fn mark_damaged_by_key(
        &self,
        key: &ProductKey,
        quantity: i64,
    ) -> BillingResult<DamageEvent> {
        let product = ProductCatalog::new(self.pool.clone()).resolve(key).await?;
        self.mark_damaged(&product.id, quantity).await
    }

    /// [`Self::restore`] addressed by business key instead of UUID.
    pub async fn restore_by_key(
        &self,
        key: &ProductKey,
        quantity: i64,
    ) -> BillingResult<DamageEvent> {
        let product = ProductCatalog::new(self.pool.clone()).resolve(key).await?;
        self.restore(&product.id, quantity).await
    }

    async fn move_stock(
        &self,
        product_id: &str,
        quantity: i64,
        kind: DamageKind,
    ) -> BillingResult<DamageEvent> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        debug!(product_id = %product_id, quantity, ?kind, "Moving stock");

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Guarded two-column move. Direction decides which column is
        // the guarded source.
        let sql = match kind {
            DamageKind::Damaged => {
                r#"
                UPDATE products
                SET quantity = quantity - ?2,
                    damaged_quantity = damaged_quantity + ?2,
                    updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#
            }
            DamageKind::Restored => {
                r#"
                UPDATE products
                SET quantity = quantity + ?2,
                    damaged_quantity = damaged_quantity - ?2,
                    updated_at = ?3
                WHERE id = ?1 AND damaged_quantity >= ?2
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(product_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Err(self.explain_guard_miss(product_id, quantity, kind).await?);
        }

        let event = DamageEvent {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            kind,
            quantity,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO damage_events (id, product_id, kind, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&event.id)
        .bind(&event.product_id)
        .bind(event.kind)
        .bind(event.quantity)
        .bind(event.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        Ok(event)
    }

    /// Distinguishes "product missing" from "not enough units" after
    /// a guard miss, reading fresh state.
    async fn explain_guard_miss(
        &self,
        product_id: &str,
        requested: i64,
        kind: DamageKind,
    ) -> DbResult<BillingError> {
        let row: Option<(String, i64, i64)> = sqlx::query_as(
            "SELECT full_name, quantity, damaged_quantity FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            None => DbError::not_found("Product", product_id).into(),
            Some((full_name, quantity, damaged_quantity)) => match kind {
                DamageKind::Damaged => BillingError::Domain(CoreError::InsufficientStock {
                    full_name,
                    available: quantity,
                    requested,
                }),
                DamageKind::Restored => {
                    BillingError::Domain(CoreError::InsufficientDamagedStock {
                        full_name,
                        available: damaged_quantity,
                        requested,
                    })
                }
            },
        })
    }

    /// Lists damage events for a product, newest first.
    pub async fn history(&self, product_id: &str) -> DbResult<Vec<DamageEvent>> {
        let events = sqlx::query_as::<_, DamageEvent>(
            r#"
            SELECT id, product_id, kind, quantity, created_at
            FROM damage_events
            WHERE product_id = ?1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_database;
    use billforge_core::types::{NewProduct, ProductKey};

    async fn seed(db: &crate::pool::Database, quantity: i64) -> String {
        db.catalog()
            .create(&NewProduct {
                key: ProductKey::new("Atta", Some("10kg")),
                quantity,
                cost_price_cents: 50_000,
                selling_price_cents: 65_000,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_mark_and_restore_conserve_total() {
        let db = test_database().await;
        let id = seed(&db, 10).await;
        let ledger = db.damage();

        ledger.mark_damaged(&id, 4).await.unwrap();
        let p = db.catalog().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.quantity, 6);
        assert_eq!(p.damaged_quantity, 4);
        assert_eq!(p.total_units(), 10);

        ledger.restore(&id, 3).await.unwrap();
        let p = db.catalog().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.quantity, 9);
        assert_eq!(p.damaged_quantity, 1);
        assert_eq!(p.total_units(), 10);
    }

    #[tokio::test]
    async fn test_cannot_damage_more_than_sellable() {
        let db = test_database().await;
        let id = seed(&db, 3).await;

        let err = db.damage().mark_damaged(&id, 5).await.unwrap_err();
        assert!(matches!(
            err,
            BillingError::Domain(CoreError::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            })
        ));

        // Nothing moved, no event recorded
        let p = db.catalog().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.quantity, 3);
        assert_eq!(p.damaged_quantity, 0);
        assert!(db.damage().history(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cannot_restore_more_than_damaged() {
        let db = test_database().await;
        let id = seed(&db, 10).await;
        let ledger = db.damage();

        ledger.mark_damaged(&id, 2).await.unwrap();
        let err = ledger.restore(&id, 3).await.unwrap_err();

        assert!(matches!(
            err,
            BillingError::Domain(CoreError::InsufficientDamagedStock {
                available: 2,
                requested: 3,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_quantity() {
        let db = test_database().await;
        let id = seed(&db, 10).await;

        assert!(db.damage().mark_damaged(&id, 0).await.is_err());
        assert!(db.damage().restore(&id, -2).await.is_err());
    }

    #[tokio::test]
    async fn test_by_key_variants() {
        let db = test_database().await;
        seed(&db, 10).await;
        let ledger = db.damage();
        let key = ProductKey::new("Atta", Some("10kg"));

        ledger.mark_damaged_by_key(&key, 2).await.unwrap();
        ledger.restore_by_key(&key, 1).await.unwrap();

        let p = db
            .catalog()
            .get_by_full_name("Atta (10kg)")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.quantity, 9);
        assert_eq!(p.damaged_quantity, 1);

        let err = ledger
            .mark_damaged_by_key(&ProductKey::new("Ghee", None), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::Domain(CoreError::UnknownProduct { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_database().await;

        let err = db.damage().mark_damaged("no-such-id", 1).await.unwrap_err();
        assert!(matches!(err, BillingError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_history_records_every_move() {
        let db = test_database().await;
        let id = seed(&db, 10).await;
        let ledger = db.damage();

        ledger.mark_damaged(&id, 4).await.unwrap();
        ledger.restore(&id, 1).await.unwrap();

        let events = ledger.history(&id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.kind == DamageKind::Damaged && e.quantity == 4));
        assert!(events.iter().any(|e| e.kind == DamageKind::Restored && e.quantity == 1));
    }

    #[tokio::test]
    async fn test_damaged_units_are_not_sellable() {
        let db = test_database().await;
        let id = seed(&db, 5).await;
        db.damage().mark_damaged(&id, 4).await.unwrap();

        let err = db
            .invoices(billforge_core::types::GstRate::from_bps(1800))
            .create(
                &billforge_core::types::Customer::named("Asha"),
                &[billforge_core::types::InvoiceRequestLine::new(
                    ProductKey::new("Atta", Some("10kg")),
                    2,
                )],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BillingError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));
    }
}
