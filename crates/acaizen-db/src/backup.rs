//! # Backup Export / Import
//!
//! Whole-store JSON backup.
//!
//! ## Document Layout
//! ```text
//! {
//!   "version": 1,                     (optional on import)
//!   "exportedAt": "2025-03-13T...",   (optional on import)
//!   ... each collection may be missing on import (read as empty)
//!   "users":      [UserAccount, ...],
//!   "products":   [Product, ...],
//!   "categories": [Category, ...],
//!   "addons":     [Addon, ...],
//!   "sales":      [Sale (with items), ...],
//!   "config":     [StoreConfig]
//! }
//! ```
//!
//! ## Import Is Destructive
//! Every collection is cleared, then refilled from the document, inside a
//! single transaction: a document that fails half way leaves the store as
//! it was. Identities are preserved.

use acaizen_core::{Addon, Category, Product, Sale, StoreConfig, UserAccount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::sale::insert_addon_snapshots;

/// Version written by [`export_backup`].
pub const BACKUP_VERSION: u32 = 1;

/// The backup file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub config: Vec<StoreConfig>,
}

impl BackupDocument {
    /// Parses and shape-checks a backup file.
    pub fn from_json(json: &str) -> DbResult<Self> {
        let document: BackupDocument = serde_json::from_str(json)?;

        if let Some(version) = document.version {
            if version > BACKUP_VERSION {
                return Err(DbError::InvalidData(format!(
                    "backup version {version} is newer than supported version {BACKUP_VERSION}"
                )));
            }
        }
        if document.config.len() > 1 {
            return Err(DbError::InvalidData(format!(
                "expected at most one config record, found {}",
                document.config.len()
            )));
        }

        Ok(document)
    }

    /// Pretty-printed JSON, ready to be written to disk.
    pub fn to_json(&self) -> DbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Record counts restored by [`import_backup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub users: usize,
    pub products: usize,
    pub categories: usize,
    pub addons: usize,
    pub sales: usize,
}

/// Reads every collection into a [`BackupDocument`].
pub async fn export_backup(db: &Database) -> DbResult<BackupDocument> {
    let document = BackupDocument {
        version: Some(BACKUP_VERSION),
        exported_at: Some(Utc::now()),
        users: db.users().list_all().await?,
        products: db.products().list_all().await?,
        categories: db.categories().list_all().await?,
        addons: db.addons().list_all().await?,
        sales: db.sales().list_all().await?,
        config: vec![db.store_config().get_or_init().await?],
    };

    info!(
        products = document.products.len(),
        sales = document.sales.len(),
        "Backup exported"
    );
    Ok(document)
}

/// Replaces the whole store with the document contents.
pub async fn import_backup(db: &Database, document: &BackupDocument) -> DbResult<BackupSummary> {
    warn!("Importing backup: all existing data will be replaced");
    let mut tx = db.pool().begin().await?;

    for table in [
        "sale_item_addons",
        "sale_items",
        "sales",
        "addons",
        "products",
        "categories",
        "users",
        "store_config",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for category in &document.categories {
        sqlx::query("INSERT INTO categories (id, name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)")
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&mut *tx)
            .await?;
    }

    for product in &document.products {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, description, image, category_id,
                stock, has_addons, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.category_id)
        .bind(product.stock)
        .bind(product.has_addons)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for addon in &document.addons {
        sqlx::query(
            "INSERT INTO addons (id, name, price_cents, product_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(addon.id)
        .bind(&addon.name)
        .bind(addon.price_cents)
        .bind(addon.product_id)
        .bind(addon.created_at)
        .bind(addon.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    for user in &document.users {
        sqlx::query("INSERT INTO users (id, email, password, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.name)
            .bind(user.role)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await?;
    }

    for sale in &document.sales {
        insert_sale(&mut tx, sale).await?;
    }

    if let Some(config) = document.config.first() {
        sqlx::query(
            r#"
            INSERT INTO store_config (
                id, store_name, address, phone, instagram, facebook,
                printer_host, printer_port, utc_offset_minutes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(acaizen_core::STORE_CONFIG_ID)
        .bind(&config.store_name)
        .bind(&config.address)
        .bind(&config.phone)
        .bind(&config.instagram)
        .bind(&config.facebook)
        .bind(&config.printer_host)
        .bind(config.printer_port)
        .bind(config.utc_offset_minutes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let summary = BackupSummary {
        users: document.users.len(),
        products: document.products.len(),
        categories: document.categories.len(),
        addons: document.addons.len(),
        sales: document.sales.len(),
    };
    info!(?summary, "Backup imported");
    Ok(summary)
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, customer_name, total_cents, payment_method, cash_received_cents,
            change_cents, created_at, operator_id, operator_name
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(sale.id)
    .bind(&sale.customer_name)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.cash_received_cents)
    .bind(sale.change_cents)
    .bind(sale.created_at)
    .bind(&sale.operator_id)
    .bind(&sale.operator_name)
    .execute(&mut *conn)
    .await?;

    for (position, item) in sale.items.iter().enumerate() {
        // Items exported without an identity get a fresh one
        let result = sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, position, product_id, product_name, quantity,
                unit_price_cents, total_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind((item.id > 0).then_some(item.id))
        .bind(sale.id)
        .bind(position as i64)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_price_cents)
        .execute(&mut *conn)
        .await?;

        insert_addon_snapshots(&mut *conn, result.last_insert_rowid(), &item.addons).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::seed::seed_sample_catalog;
    use crate::test_support::test_db;
    use acaizen_core::checkout::{draft_sale, Operator, PaymentInput};
    use acaizen_core::{Cart, PaymentMethod};

    async fn store_with_a_sale() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_sample_catalog(&db).await.unwrap();
        db.users().ensure_default_admin().await.unwrap();

        let product = db.products().list_all().await.unwrap().remove(0);
        let addons = db.addons().list_for_product(product.id).await.unwrap();
        let mut cart = Cart::new();
        cart.add_line(&product, 1, &addons[..1]).unwrap();
        let operator = Operator {
            id: "admin-1".to_string(),
            name: "Administrador".to_string(),
        };
        let draft = draft_sale(&cart, &PaymentInput::new(PaymentMethod::Pix), None, &operator, Utc::now()).unwrap();
        db.sales().record_sale(draft).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_export_then_import_restores_everything() {
        let source = store_with_a_sale().await;
        let json = export_backup(&source).await.unwrap().to_json().unwrap();

        let (target, _) = test_db().await;
        let document = BackupDocument::from_json(&json).unwrap();
        let summary = import_backup(&target, &document).await.unwrap();

        assert_eq!(summary.sales, 1);
        assert_eq!(summary.users, 1);
        assert_eq!(
            target.products().list_all().await.unwrap(),
            source.products().list_all().await.unwrap()
        );
        let sales = target.sales().list_all().await.unwrap();
        assert_eq!(sales, source.sales().list_all().await.unwrap());
        assert_eq!(sales[0].items[0].addons.len(), 1);
    }

    #[tokio::test]
    async fn test_import_clears_existing_data() {
        let db = store_with_a_sale().await;
        let empty = BackupDocument {
            version: None,
            exported_at: None,
            users: vec![],
            products: vec![],
            categories: vec![],
            addons: vec![],
            sales: vec![],
            config: vec![],
        };

        import_backup(&db, &empty).await.unwrap();

        assert!(db.products().list_all().await.unwrap().is_empty());
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db.users().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_import_leaves_store_untouched() {
        let db = store_with_a_sale().await;
        let mut document = export_backup(&db).await.unwrap();
        // Addon pointing at a product that is not in the file
        document.addons[0].product_id = 9999;

        assert!(import_backup(&db, &document).await.is_err());
        assert_eq!(db.sales().count().await.unwrap(), 1);
        assert!(!db.products().list_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        assert!(matches!(BackupDocument::from_json("[]"), Err(DbError::InvalidData(_))));
        assert!(BackupDocument::from_json(r#"{"users": "everyone"}"#).is_err());

        let newer = r#"{"version": 99, "users": []}"#;
        assert!(BackupDocument::from_json(newer).is_err());

        let partial = BackupDocument::from_json(r#"{"products": []}"#).unwrap();
        assert!(partial.users.is_empty());
        assert!(partial.config.is_empty());
    }
}
