//! # Category Repository
//!
//! Database operations for product categories.
//!
//! Categories are not protected by a foreign key: the reference from
//! products is checked when a category is deleted.

use acaizen_core::validation::{check_category_deletion, validate_category_input};
use acaizen_core::{Category, CategoryInput};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

const SELECT_CATEGORY: &str = "SELECT id, name, description, created_at, updated_at FROM categories";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category, in creation order.
    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!("{SELECT_CATEGORY} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!("{SELECT_CATEGORY} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    /// Finds a category by name, ignoring case and surrounding spaces.
    ///
    /// Compared in Rust: SQLite's `lower()` only folds ASCII ("AÇAÍ").
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let wanted = name.trim().to_lowercase();
        let category = self
            .list_all()
            .await?
            .into_iter()
            .find(|c| c.name.trim().to_lowercase() == wanted);
        Ok(category)
    }

    /// Creates a category after validating the form.
    pub async fn create(&self, input: &CategoryInput) -> DbResult<Category> {
        validate_category_input(input)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(category_id = id, name = %input.name, "Category created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Renames / re-describes a category.
    pub async fn update(&self, id: i64, input: &CategoryInput) -> DbResult<Category> {
        validate_category_input(input)?;

        let result = sqlx::query("UPDATE categories SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4")
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category that no product references.
    ///
    /// ## Errors
    /// * `DbError::Rule(CoreError::CategoryInUse)` - products still use it
    /// * `DbError::NotFound` - no such category
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        check_category_deletion(id, product_count)?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        tx.commit().await?;
        info!(category_id = id, "Category deleted");
        Ok(())
    }
}
