//! # Print Helper Client
//!
//! Sends plain-text receipts to the thermal-printer helper running on the
//! store network.
//!
//! ## Wire Contract
//! ```text
//! POST http://{host}:{port}/print           {"receipt": "<plain text>"}
//! POST http://{host}:{port}/print-kitchen   {"receipt": "<plain text>"}
//!
//! Any 2xx means printed. The response body is ignored.
//! ```
//!
//! ## Failure Policy
//! ```text
//! send_receipt / send_kitchen_ticket ──► failure logged (warn), returns false
//! test_printer                       ──► failure returned to the caller
//! ```

use std::time::Duration;

use acaizen_core::receipt::ReceiptArtifact;
use acaizen_core::StoreConfig;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PrintError, PrintResult};

/// Request timeout used when the terminal config does not set one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Print helper routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintEndpoint {
    /// Customer receipt printer.
    Receipt,
    /// Kitchen printer.
    Kitchen,
}

impl PrintEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            PrintEndpoint::Receipt => "/print",
            PrintEndpoint::Kitchen => "/print-kitchen",
        }
    }
}

#[derive(Serialize)]
struct PrintRequest<'a> {
    receipt: &'a str,
}

/// Client for the print helper of one store.
///
/// Cheap to clone: the underlying `reqwest::Client` is shared.
#[derive(Debug, Clone)]
pub struct PrinterDispatcher {
    client: reqwest::Client,
    base_url: String,
}

impl PrinterDispatcher {
    /// Creates a dispatcher for `base_url` (`http://host:port`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PrintResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(PrinterDispatcher { client, base_url })
    }

    /// Creates a dispatcher for the printer configured in the store settings.
    pub fn from_store_config(config: &StoreConfig, timeout: Duration) -> PrintResult<Self> {
        Self::new(config.printer_base_url(), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts `text` to one endpoint and reports the outcome.
    pub async fn post(&self, endpoint: PrintEndpoint, text: &str) -> PrintResult<()> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!(url = %url, bytes = text.len(), "Sending to print helper");

        let response = self
            .client
            .post(&url)
            .json(&PrintRequest { receipt: text })
            .send()
            .await
            .map_err(|source| PrintError::Unreachable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::Rejected {
                url,
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Best-effort customer receipt. Never fails: returns whether it printed.
    pub async fn send_receipt(&self, receipt: &ReceiptArtifact) -> bool {
        self.best_effort(PrintEndpoint::Receipt, &receipt.plain_text).await
    }

    /// Best-effort kitchen ticket. Never fails: returns whether it printed.
    pub async fn send_kitchen_ticket(&self, ticket: &ReceiptArtifact) -> bool {
        self.best_effort(PrintEndpoint::Kitchen, &ticket.plain_text).await
    }

    async fn best_effort(&self, endpoint: PrintEndpoint, text: &str) -> bool {
        match self.post(endpoint, text).await {
            Ok(()) => {
                info!(endpoint = endpoint.path(), "Receipt sent to printer");
                true
            }
            Err(err) => {
                warn!(endpoint = endpoint.path(), error = %err, "Printing failed, sale is unaffected");
                false
            }
        }
    }

    /// Prints the fixed test page and reports the outcome.
    pub async fn test_printer(&self, store_name: &str, now: DateTime<FixedOffset>) -> PrintResult<()> {
        let text = test_receipt_text(store_name, now);
        self.post(PrintEndpoint::Receipt, &text).await?;
        info!(url = %self.base_url, "Printer test succeeded");
        Ok(())
    }
}

/// The page printed by [`PrinterDispatcher::test_printer`].
pub fn test_receipt_text(store_name: &str, now: DateTime<FixedOffset>) -> String {
    format!(
        "*** TESTE DE IMPRESSORA ***\n\n{store_name}\nSistema de PDV\n\n\
         Impressora configurada com sucesso!\n\n\
         Data/Hora: {}\n\n*** FIM DO TESTE ***\n\n\n\n",
        now.format("%d/%m/%Y %H:%M:%S")
    )
}
