//! # Product Catalog Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD keyed by UUID or by the `"name (weight)"` business key
//! - Administrative stock corrections (absolute writes)
//! - Soft delete (history keeps referencing the row)
//!
//! ## Two Ways Stock Changes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ADMIN CORRECTION (this module)                                 │
//! │     UPDATE products SET quantity = ?          absolute value,   │
//! │                                               no availability   │
//! │                                               check             │
//! │                                                                 │
//! │  SALE / DAMAGE (invoice.rs, damage.rs)                          │
//! │     UPDATE products SET quantity = quantity - ?                 │
//! │     WHERE id = ? AND quantity >= ?            guarded delta,    │
//! │                                               all-or-nothing    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use billforge_core::types::{NewProduct, Product, ProductKey, ProductUpdate};
use billforge_core::validation::{validate_price_paise, validate_product_name, validate_weight};
use billforge_core::CoreError;

use crate::error::{BillingError, BillingResult, DbError, DbResult};

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = ProductCatalog::new(pool);
///
/// let product = catalog
///     .create(&NewProduct {
///         key: ProductKey::new("Rice", Some("5kg")),
///         quantity: 10,
///         cost_price_cents: 40_000,
///         selling_price_cents: 50_000,
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    id, name, weight, full_name,
    quantity, damaged_quantity,
    cost_price_cents, selling_price_cents,
    is_active, created_at, updated_at
"#;

impl ProductCatalog {
    /// Creates a new ProductCatalog.
    pub fn new(pool: SqlitePool) -> Self {
        ProductCatalog { pool }
    }

    /// Creates a new product.
    ///
    /// ## Rules
    /// - Name/weight/prices are validated first
    /// - `(name, weight)` must be unique among all products,
    ///   including soft-deleted ones (their invoices still carry the
    ///   full name)
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(BillingError::Domain(DuplicateProduct))` - Key taken
    pub async fn create(&self, new: &NewProduct) -> BillingResult<Product> {
        validate_product_name(&new.key.name).map_err(CoreError::from)?;
        validate_weight(new.key.weight.as_deref()).map_err(CoreError::from)?;
        validate_price_paise(new.cost_price_cents).map_err(CoreError::from)?;
        validate_price_paise(new.selling_price_cents).map_err(CoreError::from)?;

        if new.quantity < 0 {
            return Err(BillingError::Domain(CoreError::InvalidQuantity {
                quantity: new.quantity,
            }));
        }

        let full_name = new.key.full_name();
        debug!(full_name = %full_name, "Creating product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.key.name.clone(),
            weight: new.key.weight.clone(),
            full_name: full_name.clone(),
            quantity: new.quantity,
            damaged_quantity: 0,
            cost_price_cents: new.cost_price_cents,
            selling_price_cents: new.selling_price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                id, name, weight, full_name,
                quantity, damaged_quantity,
                cost_price_cents, selling_price_cents,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.weight)
        .bind(&product.full_name)
        .bind(product.quantity)
        .bind(product.damaged_quantity)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(product),
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { .. } => {
                    Err(BillingError::Domain(CoreError::DuplicateProduct {
                        full_name,
                    }))
                }
                other => Err(other.into()),
            },
        }
    }

    /// Gets a product by its UUID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found (active or not)
    /// * `Ok(None)` - No such product
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its derived `"name (weight)"` key.
    pub async fn get_by_full_name(&self, full_name: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE full_name = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(full_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Resolves a business key to an active product.
    ///
    /// ## Returns
    /// * `Err(BillingError::Domain(UnknownProduct))` - No active
    ///   product with this key (missing or soft-deleted)
    pub async fn resolve(&self, key: &ProductKey) -> BillingResult<Product> {
        let full_name = key.full_name();

        match self.get_by_full_name(&full_name).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(BillingError::Domain(CoreError::UnknownProduct {
                full_name,
            })),
        }
    }

    /// Lists active products ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY full_name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Applies administrative field corrections.
    ///
    /// Absolute writes, intentionally unguarded: the shopkeeper is
    /// stating new facts (a recount, a price change), not reserving
    /// stock. `None` fields are left untouched. The quantity CHECK
    /// constraint still rejects negatives.
    pub async fn update(&self, id: &str, update: &ProductUpdate) -> BillingResult<Product> {
        if let Some(quantity) = update.quantity {
            if quantity < 0 {
                return Err(BillingError::Domain(CoreError::InvalidQuantity {
                    quantity,
                }));
            }
        }
        if let Some(price) = update.cost_price_cents {
            validate_price_paise(price).map_err(CoreError::from)?;
        }
        if let Some(price) = update.selling_price_cents {
            validate_price_paise(price).map_err(CoreError::from)?;
        }

        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                quantity = COALESCE(?2, quantity),
                cost_price_cents = COALESCE(?3, cost_price_cents),
                selling_price_cents = COALESCE(?4, selling_price_cents),
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.quantity)
        .bind(update.cost_price_cents)
        .bind(update.selling_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id).into())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical invoices still reference this product
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Reactivates a soft-deleted product.
    pub async fn reactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 1, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_database;
    use billforge_core::CoreError;

    fn rice_5kg() -> NewProduct {
        NewProduct {
            key: ProductKey::new("Rice", Some("5kg")),
            quantity: 10,
            cost_price_cents: 40_000,
            selling_price_cents: 50_000,
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let db = test_database().await;
        let catalog = db.catalog();

        let created = catalog.create(&rice_5kg()).await.unwrap();
        assert_eq!(created.full_name, "Rice (5kg)");
        assert_eq!(created.quantity, 10);
        assert_eq!(created.damaged_quantity, 0);

        let resolved = catalog
            .resolve(&ProductKey::new("Rice", Some("5kg")))
            .await
            .unwrap();
        assert_eq!(resolved.id, created.id);
    }

    #[tokio::test]
    async fn test_weight_variants_are_distinct_products() {
        let db = test_database().await;
        let catalog = db.catalog();

        catalog.create(&rice_5kg()).await.unwrap();
        let mut one_kg = rice_5kg();
        one_kg.key = ProductKey::new("Rice", Some("1kg"));
        catalog.create(&one_kg).await.unwrap();

        assert_eq!(catalog.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected() {
        let db = test_database().await;
        let catalog = db.catalog();

        catalog.create(&rice_5kg()).await.unwrap();
        let err = catalog.create(&rice_5kg()).await.unwrap_err();

        assert!(matches!(
            err,
            BillingError::Domain(CoreError::DuplicateProduct { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_leaves_unset_fields_alone() {
        let db = test_database().await;
        let catalog = db.catalog();

        let created = catalog.create(&rice_5kg()).await.unwrap();

        let updated = catalog
            .update(
                &created.id,
                &ProductUpdate {
                    quantity: Some(25),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 25);
        assert_eq!(updated.selling_price_cents, 50_000);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_quantity() {
        let db = test_database().await;
        let catalog = db.catalog();

        let created = catalog.create(&rice_5kg()).await.unwrap();
        let err = catalog
            .update(
                &created.id,
                &ProductUpdate {
                    quantity: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BillingError::Domain(CoreError::InvalidQuantity { quantity: -1 })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_resolve() {
        let db = test_database().await;
        let catalog = db.catalog();

        let created = catalog.create(&rice_5kg()).await.unwrap();
        catalog.soft_delete(&created.id).await.unwrap();

        let err = catalog
            .resolve(&ProductKey::new("Rice", Some("5kg")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::Domain(CoreError::UnknownProduct { .. })
        ));

        // Row still exists for invoice history
        assert!(catalog.get_by_id(&created.id).await.unwrap().is_some());

        catalog.reactivate(&created.id).await.unwrap();
        assert!(catalog
            .resolve(&ProductKey::new("Rice", Some("5kg")))
            .await
            .is_ok());
    }
}
