//! # Addon Repository
//!
//! Database operations for the optional extras attached to a product.
//!
//! ## Product Flag
//! `products.has_addons` tells the cashier screen whether to open the addon
//! picker. Every write here recomputes it for the products involved, in the
//! same transaction.

use acaizen_core::validation::validate_addon_input;
use acaizen_core::{Addon, AddonInput};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const SELECT_ADDON: &str = "SELECT id, name, price_cents, product_id, created_at, updated_at FROM addons";

/// Repository for addon database operations.
#[derive(Debug, Clone)]
pub struct AddonRepository {
    pool: SqlitePool,
}

impl AddonRepository {
    /// Creates a new AddonRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddonRepository { pool }
    }

    /// Lists every addon.
    pub async fn list_all(&self) -> DbResult<Vec<Addon>> {
        let addons = sqlx::query_as::<_, Addon>(&format!("{SELECT_ADDON} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(addons)
    }

    /// Lists the addons offered for one product.
    pub async fn list_for_product(&self, product_id: i64) -> DbResult<Vec<Addon>> {
        let addons = sqlx::query_as::<_, Addon>(&format!("{SELECT_ADDON} WHERE product_id = ?1 ORDER BY id"))
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(addons)
    }

    /// Gets an addon by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Addon>> {
        let addon = sqlx::query_as::<_, Addon>(&format!("{SELECT_ADDON} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(addon)
    }

    /// Fetches the given addons, keeping the requested order.
    ///
    /// Unknown ids are an error: the picker only offers stored addons.
    pub async fn get_many(&self, ids: &[i64]) -> DbResult<Vec<Addon>> {
        let mut addons = Vec::with_capacity(ids.len());
        for &id in ids {
            let addon = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Addon", id))?;
            addons.push(addon);
        }
        Ok(addons)
    }

    /// Creates an addon for an existing product.
    pub async fn create(&self, input: &AddonInput) -> DbResult<Addon> {
        validate_addon_input(input)?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        ensure_product(&mut tx, input.product_id).await?;

        let result = sqlx::query(
            "INSERT INTO addons (name, price_cents, product_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
        )
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(input.product_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        refresh_has_addons(&mut tx, input.product_id).await?;

        tx.commit().await?;

        let id = result.last_insert_rowid();
        info!(addon_id = id, product_id = input.product_id, "Addon created");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Addon", id))
    }

    /// Updates an addon, possibly moving it to another product.
    pub async fn update(&self, id: i64, input: &AddonInput) -> DbResult<Addon> {
        validate_addon_input(input)?;
        let previous = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Addon", id))?;

        let mut tx = self.pool.begin().await?;
        ensure_product(&mut tx, input.product_id).await?;

        sqlx::query("UPDATE addons SET name = ?1, price_cents = ?2, product_id = ?3, updated_at = ?4 WHERE id = ?5")
            .bind(input.name.trim())
            .bind(input.price_cents)
            .bind(input.product_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        refresh_has_addons(&mut tx, input.product_id).await?;
        if previous.product_id != input.product_id {
            refresh_has_addons(&mut tx, previous.product_id).await?;
        }
        tx.commit().await?;

        debug!(addon_id = id, "Addon updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Addon", id))
    }

    /// Deletes an addon. Past sales keep their snapshots.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let addon = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Addon", id))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM addons WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        refresh_has_addons(&mut tx, addon.product_id).await?;
        tx.commit().await?;

        info!(addon_id = id, "Addon deleted");
        Ok(())
    }
}

async fn ensure_product(conn: &mut SqliteConnection, product_id: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Product", product_id))
}

async fn refresh_has_addons(conn: &mut SqliteConnection, product_id: i64) -> DbResult<()> {
    sqlx::query(
        "UPDATE products SET has_addons = EXISTS (SELECT 1 FROM addons WHERE product_id = ?1) WHERE id = ?1",
    )
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
