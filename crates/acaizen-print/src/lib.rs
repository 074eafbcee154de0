//! # acaizen-print: Printer Dispatcher
//!
//! Delivers receipts rendered by `acaizen_core::receipt`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale committed ──► render_receipt() ──► ReceiptArtifact                │
//! │                                              │                          │
//! │           ┌──────────────────────────────────┼─────────────────┐        │
//! │           ▼                                  ▼                 ▼        │
//! │   PrinterDispatcher               print_dialog_document   download_html │
//! │   (HTTP print helper,             (window.print())        (.html file)  │
//! │    best effort)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`dispatcher`] - Print helper client
//! - [`artifacts`] - Print-dialog document and HTML download
//! - [`error`] - Print errors

pub mod artifacts;
pub mod dispatcher;
pub mod error;

pub use artifacts::{download_html, print_dialog_document, DEFAULT_FALLBACK_CLOSE_MS};
pub use dispatcher::{PrintEndpoint, PrinterDispatcher, DEFAULT_REQUEST_TIMEOUT};
pub use error::{PrintError, PrintResult};
