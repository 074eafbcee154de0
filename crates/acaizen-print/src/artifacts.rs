//! # Same-Device Receipt Artifacts
//!
//! The two paths that do not need the print helper:
//!
//! ```text
//! ReceiptArtifact ──┬──► print_dialog_document() ──► HTML that calls
//!                   │                                window.print() on load
//!                   │                                and closes itself
//!                   │
//!                   └──► download_html() ──► cupom-acaizen-{millis}.html
//! ```
//!
//! The host UI owns whatever surface displays these documents and releases
//! it when done.

use std::path::{Path, PathBuf};

use acaizen_core::receipt::{html_shell, AutoPrint, ReceiptArtifact};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::PrintResult;

/// Fallback close delay when the print dialog never reports back.
pub const DEFAULT_FALLBACK_CLOSE_MS: u64 = 5000;

/// Builds the self-printing document for the platform print dialog.
pub fn print_dialog_document(receipt: &ReceiptArtifact, fallback_close_ms: u64) -> String {
    html_shell(
        &receipt.title,
        &receipt.html_body,
        Some(AutoPrint { fallback_close_ms }),
    )
}

/// `cupom-acaizen-{unix millis}.html`
pub fn download_file_name(now: DateTime<Utc>) -> String {
    format!("cupom-acaizen-{}.html", now.timestamp_millis())
}

/// Saves the standalone HTML receipt into `dir` and returns its path.
pub async fn download_html(dir: &Path, receipt: &ReceiptArtifact, now: DateTime<Utc>) -> PrintResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(download_file_name(now));
    tokio::fs::write(&path, receipt.html.as_bytes()).await?;

    info!(path = %path.display(), "Receipt saved");
    Ok(path)
}
