//! # Settings Commands
//!
//! Store settings, the printer test and the JSON backup.
//!
//! ```text
//! save_store_config ──► store_config row ──► printer.reconfigure()
//!                                            (new host/port used by the next print)
//! ```
//!
//! ## Backup
//! Importing replaces every collection with the file contents. Export first
//! if the current data matters.

use acaizen_core::StoreConfig;
use acaizen_db::backup::{self, BackupDocument, BackupSummary};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, PrinterState};

pub async fn get_store_config(db: &DbState) -> Result<StoreConfig, ApiError> {
    Ok(db.inner().store_config().get_or_init().await?)
}

/// Saves the store settings and points the printer at the saved endpoint.
pub async fn save_store_config(
    db: &DbState,
    printer: &PrinterState,
    config: StoreConfig,
) -> Result<StoreConfig, ApiError> {
    debug!(store_name = %config.store_name, "save_store_config command");
    let saved = db.inner().store_config().save(&config).await?;
    printer.reconfigure(&saved).await?;
    info!(printer = %saved.printer_base_url(), "Store settings saved");
    Ok(saved)
}

/// Prints the test page. Unlike sale printing, a failure is returned.
pub async fn test_printer(db: &DbState, printer: &PrinterState) -> Result<(), ApiError> {
    let store = db.inner().store_config().get_or_init().await?;
    let now = Utc::now().with_timezone(&store.local_offset());
    printer
        .dispatcher()
        .await
        .test_printer(&store.store_name, now)
        .await?;
    Ok(())
}

/// The whole store as pretty-printed backup JSON.
pub async fn export_backup(db: &DbState) -> Result<String, ApiError> {
    debug!("export_backup command");
    let document = backup::export_backup(db.inner()).await?;
    Ok(document.to_json()?)
}

/// `acaizen_backup_{YYYY-MM-DD}.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("acaizen_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Replaces all data with the backup in `json`.
///
/// A malformed document is rejected before anything is deleted.
pub async fn import_backup(db: &DbState, json: &str) -> Result<BackupSummary, ApiError> {
    debug!(bytes = json.len(), "import_backup command");
    let document = BackupDocument::from_json(json)?;
    let summary = backup::import_backup(db.inner(), &document).await?;
    info!(
        users = summary.users,
        products = summary.products,
        sales = summary.sales,
        "Backup imported"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::commands::catalog::{delete_product, list_products};
    use crate::error::ErrorCode;
    use crate::test_support::{product_named, test_context};

    fn pointing_at(server: &MockServer, base: StoreConfig) -> StoreConfig {
        let address = server.address();
        StoreConfig {
            printer_host: address.ip().to_string(),
            printer_port: i64::from(address.port()),
            ..base
        }
    }

    #[tokio::test]
    async fn test_save_reconfigures_printer() {
        let ctx = test_context().await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/print"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let current = get_store_config(&ctx.db).await.unwrap();
        let saved = save_store_config(&ctx.db, &ctx.printer, pointing_at(&server, current))
            .await
            .unwrap();
        assert_eq!(get_store_config(&ctx.db).await.unwrap(), saved);
        assert_eq!(ctx.printer.dispatcher().await.base_url(), saved.printer_base_url());

        test_printer(&ctx.db, &ctx.printer).await.unwrap();
    }

    #[tokio::test]
    async fn test_printer_failure_is_reported() {
        let ctx = test_context().await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/print"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let current = get_store_config(&ctx.db).await.unwrap();
        save_store_config(&ctx.db, &ctx.printer, pointing_at(&server, current))
            .await
            .unwrap();

        let err = test_printer(&ctx.db, &ctx.printer).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PrinterError);
    }

    #[tokio::test]
    async fn test_blank_store_name_is_rejected() {
        let ctx = test_context().await;
        let config = StoreConfig {
            store_name: "  ".to_string(),
            ..get_store_config(&ctx.db).await.unwrap()
        };
        let err = save_store_config(&ctx.db, &ctx.printer, config).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_backup_round_trip() {
        let ctx = test_context().await;
        let json = export_backup(&ctx.db).await.unwrap();
        let before = list_products(&ctx.db, None).await.unwrap();

        let juice = product_named(&ctx, "Suco Natural").await;
        delete_product(&ctx.db, juice.id).await.unwrap();

        let summary = import_backup(&ctx.db, &json).await.unwrap();
        assert_eq!(summary.products, before.len());
        assert_eq!(summary.users, 1);
        assert_eq!(list_products(&ctx.db, None).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_malformed_backup_keeps_data() {
        let ctx = test_context().await;
        let before = list_products(&ctx.db, None).await.unwrap();

        assert!(import_backup(&ctx.db, "{\"products\": 3}").await.is_err());
        assert_eq!(list_products(&ctx.db, None).await.unwrap(), before);
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name(date), "acaizen_backup_2024-03-09.json");
    }
}
