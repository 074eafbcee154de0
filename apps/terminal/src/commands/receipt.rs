//! # Receipt Commands
//!
//! The three independent ways to get a receipt out of the terminal, plus
//! re-rendering the receipt of a past sale.
//!
//! ```text
//! ReceiptArtifact ──┬──► print_receipt()      POST to the print helper (best effort)
//!                   ├──► print_dialog()       HTML that opens the print dialog and closes itself
//!                   └──► download_receipt()   cupom-acaizen-{millis}.html on disk
//! ```
//!
//! None of them is needed for a sale to be complete: the sale is stored
//! before any receipt exists.

use std::path::PathBuf;

use acaizen_core::receipt::{render_receipt, ReceiptArtifact, StoreInfo};
use chrono::Utc;
use tracing::{debug, info};

use crate::commands::sale::get_sale;
use crate::error::ApiError;
use crate::state::{DbState, PrinterSettings, PrinterState, ReceiptSettings};

/// Renders the receipt of a stored sale again, with the current store info.
pub async fn reprint_sale(db: &DbState, sale_id: i64) -> Result<ReceiptArtifact, ApiError> {
    debug!(sale_id, "reprint_sale command");
    let sale = get_sale(db, sale_id).await?;
    let store = db.inner().store_config().get_or_init().await?;
    Ok(render_receipt(&sale, &StoreInfo::from(&store)))
}

/// Sends a receipt to the print helper. Returns whether it printed.
pub async fn print_receipt(printer: &PrinterState, receipt: &ReceiptArtifact) -> bool {
    debug!(title = %receipt.title, "print_receipt command");
    printer.dispatcher().await.send_receipt(receipt).await
}

/// HTML document for the same-device print dialog path.
pub fn print_dialog(receipt: &ReceiptArtifact, settings: &PrinterSettings) -> String {
    acaizen_print::print_dialog_document(receipt, settings.fallback_close_ms)
}

/// Writes the receipt to the download directory and returns the file path.
pub async fn download_receipt(
    receipt: &ReceiptArtifact,
    settings: &ReceiptSettings,
) -> Result<PathBuf, ApiError> {
    let path = acaizen_print::download_html(&settings.download_dir, receipt, Utc::now()).await?;
    info!(path = %path.display(), "Receipt downloaded");
    Ok(path)
}
