//! # Store Config Repository
//!
//! The singleton `store_config` row (id = 1). Reads create it with the
//! defaults when absent; saves are read-modify-write of the whole record.

use acaizen_core::{StoreConfig, ValidationError, STORE_CONFIG_ID};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Repository for the store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfigRepository {
    pool: SqlitePool,
}

impl StoreConfigRepository {
    /// Creates a new StoreConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreConfigRepository { pool }
    }

    /// Returns the configuration, storing the defaults on first read.
    pub async fn get_or_init(&self) -> DbResult<StoreConfig> {
        let existing = sqlx::query_as::<_, StoreConfig>(
            r#"
            SELECT id, store_name, address, phone, instagram, facebook,
                   printer_host, printer_port, utc_offset_minutes
            FROM store_config WHERE id = ?1
            "#,
        )
        .bind(STORE_CONFIG_ID)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(config) => Ok(config),
            None => {
                let config = StoreConfig::default();
                self.save(&config).await?;
                info!("Store configuration initialized with defaults");
                Ok(config)
            }
        }
    }

    /// Stores the configuration (always under the singleton id).
    pub async fn save(&self, config: &StoreConfig) -> DbResult<StoreConfig> {
        if config.store_name.trim().is_empty() {
            return Err(ValidationError::required("store name").into());
        }
        if !(1..=65535).contains(&config.printer_port) {
            return Err(ValidationError::OutOfRange {
                field: "printer port".to_string(),
                min: 1,
                max: 65535,
            }
            .into());
        }

        let mut saved = config.clone();
        saved.id = STORE_CONFIG_ID;

        sqlx::query(
            r#"
            INSERT INTO store_config (
                id, store_name, address, phone, instagram, facebook,
                printer_host, printer_port, utc_offset_minutes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                store_name = excluded.store_name,
                address = excluded.address,
                phone = excluded.phone,
                instagram = excluded.instagram,
                facebook = excluded.facebook,
                printer_host = excluded.printer_host,
                printer_port = excluded.printer_port,
                utc_offset_minutes = excluded.utc_offset_minutes
            "#,
        )
        .bind(saved.id)
        .bind(&saved.store_name)
        .bind(&saved.address)
        .bind(&saved.phone)
        .bind(&saved.instagram)
        .bind(&saved.facebook)
        .bind(&saved.printer_host)
        .bind(saved.printer_port)
        .bind(saved.utc_offset_minutes)
        .execute(&self.pool)
        .await?;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;
    use crate::DbError;

    #[tokio::test]
    async fn test_defaults_on_first_read() {
        let (db, _) = test_db().await;
        let config = db.store_config().get_or_init().await.unwrap();

        assert_eq!(config.store_name, "Açaízen SmartHUB");
        assert_eq!(config.printer_base_url(), "http://localhost:3333");
    }

    #[tokio::test]
    async fn test_read_modify_write() {
        let (db, _) = test_db().await;
        let repo = db.store_config();

        let mut config = repo.get_or_init().await.unwrap();
        config.printer_host = "192.168.0.50".to_string();
        config.id = 42;
        repo.save(&config).await.unwrap();

        let reloaded = repo.get_or_init().await.unwrap();
        assert_eq!(reloaded.id, 1);
        assert_eq!(reloaded.printer_host, "192.168.0.50");

        config.printer_port = 0;
        assert!(matches!(repo.save(&config).await, Err(DbError::Rule(_))));
    }
}
