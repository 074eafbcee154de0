//! # acaizen-db: Database Layer for Açaízen POS
//!
//! The local record store: SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Açaízen POS Data Flow                            │
//! │                                                                         │
//! │  Terminal command (finalize_sale, list_products, ...)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    acaizen-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │               │    │ UserRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   backup (JSON)   products_csv (CSV)   seed (sample catalog)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (acaizen.db in the platform data directory)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per collection
//! - [`backup`] - Whole-store JSON export/import
//! - [`products_csv`] - Product catalog CSV export/import
//! - [`seed`] - Sample catalog for a fresh store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acaizen_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("acaizen.db")).await?;
//! let config = db.store_config().get_or_init().await?;
//! let sales = db.sales().list_all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod products_csv;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::addon::AddonRepository;
pub use repository::category::CategoryRepository;
pub use repository::config::StoreConfigRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use acaizen_core::{CategoryInput, ProductInput};

    use crate::{Database, DbConfig};

    /// Fresh in-memory store with one category ("Açaí"), whose id is returned.
    pub async fn test_db() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db
            .categories()
            .create(&CategoryInput {
                name: "Açaí".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (db, category.id)
    }

    pub fn acai_input(category_id: i64) -> ProductInput {
        ProductInput {
            name: "Açaí 300ml".to_string(),
            price_cents: 1590,
            description: "Açaí puro".to_string(),
            image: None,
            category_id,
            stock: 50,
            has_addons: false,
        }
    }
}
