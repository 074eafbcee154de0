//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD operations (validated with `acaizen_core::validation`)
//! - Stock adjustment by delta (sales decrement, no floor)
//! - Per-category counts for the category deletion guard
//!
//! Deleting a product removes its addons in the same transaction.

use acaizen_core::validation::validate_product_input;
use acaizen_core::{Product, ProductInput};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = "SELECT id, name, price_cents, description, image, category_id, \
     stock, has_addons, created_at, updated_at FROM products";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let acai = repo.get_by_id(1).await?;
/// repo.adjust_stock(1, -2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, in creation order.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Lists the products of one category (the cashier's category tabs).
    pub async fn list_by_category(&self, category_id: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE category_id = ?1 ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Gets a product by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Creates a product after validating the form.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, price_cents, description, image, category_id,
                stock, has_addons, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.category_id)
        .bind(input.stock)
        .bind(input.has_addons)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(product_id = id, name = %input.name, "Product created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Replaces the editable fields of a product.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?1, price_cents = ?2, description = ?3, image = ?4,
                category_id = ?5, stock = ?6, has_addons = ?7, updated_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(&input.description)
        .bind(&input.image)
        .bind(input.category_id)
        .bind(input.stock)
        .bind(input.has_addons)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = id, "Product updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product and its addons.
    ///
    /// Past sales keep their snapshots; nothing else references products.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM addons WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Adds `delta` to the stock counter.
    ///
    /// Negative results are allowed: stock is advisory.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
            .bind(delta)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = id, delta, "Stock adjusted");
        Ok(())
    }

    /// Number of products referencing a category.
    pub async fn count_by_category(&self, category_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
            .bind(category_id)
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
    use crate::test_support::{acai_input, test_db};
    use crate::DbError;
    use acaizen_core::{AddonInput, CoreError};

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, category_id) = test_db().await;
        let repo = db.products();

        let created = repo.create(&acai_input(category_id)).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Açaí 300ml");
        assert_eq!(fetched.price_cents, 1590);
        assert!(!fetched.has_addons);
        assert_eq!(repo.count_by_category(category_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (db, category_id) = test_db().await;
        let mut input = acai_input(category_id);
        input.name = "   ".to_string();

        let err = db.products().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_missing_product() {
        let (db, category_id) = test_db().await;
        let repo = db.products();
        let created = repo.create(&acai_input(category_id)).await.unwrap();

        let mut input = acai_input(category_id);
        input.price_cents = 1790;
        let updated = repo.update(created.id, &input).await.unwrap();
        assert_eq!(updated.price_cents, 1790);

        let err = repo.update(999, &input).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stock_goes_negative_without_floor() {
        let (db, category_id) = test_db().await;
        let repo = db.products();
        let created = repo.create(&acai_input(category_id)).await.unwrap();

        repo.adjust_stock(created.id, -(created.stock + 3)).await.unwrap();
        let product = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(product.stock, -3);
    }

    #[tokio::test]
    async fn test_delete_removes_addons() {
        let (db, category_id) = test_db().await;
        let product = db.products().create(&acai_input(category_id)).await.unwrap();
        db.addons()
            .create(&AddonInput {
                name: "Granola".to_string(),
                price_cents: 200,
                product_id: product.id,
            })
            .await
            .unwrap();

        db.products().delete(product.id).await.unwrap();

        assert!(db.products().get_by_id(product.id).await.unwrap().is_none());
        assert!(db.addons().list_all().await.unwrap().is_empty());
    }
}
