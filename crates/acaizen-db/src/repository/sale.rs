//! # Sale Repository
//!
//! Database operations for the sales log.
//!
//! ## Sale Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   record_sale (one transaction)                         │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. INSERT sales            → sale id assigned                       │
//! │    2. INSERT sale_items       → one row per cart line, in order        │
//! │       └─ INSERT sale_item_addons (frozen name + price)                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back both phases: the log never holds a sale        │
//! │  without its items.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock decrements are NOT part of this transaction. They run after the
//! commit and are best effort.

use std::collections::HashMap;

use acaizen_core::checkout::NewSale;
use acaizen_core::{AddonSnapshot, Sale, SaleItem};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;

const SELECT_SALE: &str = "SELECT id, customer_name, total_cents, payment_method, cash_received_cents, \
     change_cents, created_at, operator_id, operator_name FROM sales";

const SELECT_SALE_ITEM: &str = "SELECT id, sale_id, product_id, product_name, quantity, \
     unit_price_cents, total_price_cents FROM sale_items";

#[derive(Debug, sqlx::FromRow)]
struct AddonSnapshotRow {
    sale_item_id: i64,
    addon_id: i64,
    name: String,
    price_cents: i64,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Stores a validated sale and its items atomically.
    ///
    /// ## Returns
    /// The stored [`Sale`], with the identities assigned by the store.
    pub async fn record_sale(&self, draft: NewSale) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                customer_name, total_cents, payment_method, cash_received_cents,
                change_cents, created_at, operator_id, operator_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&draft.customer_name)
        .bind(draft.total_cents)
        .bind(draft.payment_method)
        .bind(draft.cash_received_cents)
        .bind(draft.change_cents)
        .bind(draft.created_at)
        .bind(&draft.operator_id)
        .bind(&draft.operator_name)
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        let mut item_ids = Vec::with_capacity(draft.items.len());
        for (position, item) in draft.items.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, product_name, quantity,
                    unit_price_cents, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(sale_id)
            .bind(position as i64)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .execute(&mut *tx)
            .await?;

            let item_id = result.last_insert_rowid();
            insert_addon_snapshots(&mut tx, item_id, &item.addons).await?;
            item_ids.push(item_id);
        }

        tx.commit().await?;

        info!(
            sale_id,
            total_cents = draft.total_cents,
            items = item_ids.len(),
            payment = draft.payment_method.as_str(),
            "Sale recorded"
        );
        Ok(draft.into_sale(sale_id, &item_ids))
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "{SELECT_SALE_ITEM} WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let addon_rows = sqlx::query_as::<_, AddonSnapshotRow>(
            r#"
            SELECT a.sale_item_id, a.addon_id, a.name, a.price_cents
            FROM sale_item_addons a
            INNER JOIN sale_items i ON i.id = a.sale_item_id
            WHERE i.sale_id = ?1
            ORDER BY a.sale_item_id, a.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        sale.items = attach_addons(items, addon_rows);
        Ok(Some(sale))
    }

    /// The whole sales log, oldest first, items included.
    ///
    /// Reports and backups read everything; the log of a single store
    /// stays small enough for that.
    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let mut sales = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, SaleItem>(&format!("{SELECT_SALE_ITEM} ORDER BY sale_id, position"))
            .fetch_all(&self.pool)
            .await?;

        let addon_rows = sqlx::query_as::<_, AddonSnapshotRow>(
            "SELECT sale_item_id, addon_id, name, price_cents FROM sale_item_addons ORDER BY sale_item_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        for item in attach_addons(items, addon_rows) {
            by_sale.entry(item.sale_id).or_default().push(item);
        }
        for sale in &mut sales {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(count = sales.len(), "Loaded sales log");
        Ok(sales)
    }

    /// Number of stored sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Writes the frozen addon list of one sale item.
pub(crate) async fn insert_addon_snapshots(
    conn: &mut SqliteConnection,
    sale_item_id: i64,
    addons: &[AddonSnapshot],
) -> DbResult<()> {
    for (position, addon) in addons.iter().enumerate() {
        sqlx::query(
            "INSERT INTO sale_item_addons (sale_item_id, position, addon_id, name, price_cents) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(sale_item_id)
        .bind(position as i64)
        .bind(addon.id)
        .bind(&addon.name)
        .bind(addon.price_cents)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn attach_addons(items: Vec<SaleItem>, rows: Vec<AddonSnapshotRow>) -> Vec<SaleItem> {
    let mut by_item: HashMap<i64, Vec<AddonSnapshot>> = HashMap::new();
    for row in rows {
        by_item.entry(row.sale_item_id).or_default().push(AddonSnapshot {
            id: row.addon_id,
            name: row.name,
            price_cents: row.price_cents,
        });
    }

    items
        .into_iter()
        .map(|mut item| {
            item.addons = by_item.remove(&item.id).unwrap_or_default();
            item
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
