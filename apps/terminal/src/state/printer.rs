//! # Printer State
//!
//! The dispatcher for the print helper configured in the store settings.
//! Saving new settings swaps it, so the next print goes to the new address.

use std::sync::Arc;
use std::time::Duration;

use acaizen_core::StoreConfig;
use acaizen_print::{PrintResult, PrinterDispatcher};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PrinterState {
    dispatcher: Arc<RwLock<PrinterDispatcher>>,
    timeout: Duration,
}

impl PrinterState {
    pub fn new(config: &StoreConfig, timeout: Duration) -> PrintResult<Self> {
        let dispatcher = PrinterDispatcher::from_store_config(config, timeout)?;
        Ok(PrinterState {
            dispatcher: Arc::new(RwLock::new(dispatcher)),
            timeout,
        })
    }

    /// Clone of the current dispatcher; the lock is released on return.
    pub async fn dispatcher(&self) -> PrinterDispatcher {
        self.dispatcher.read().await.clone()
    }

    /// Points the dispatcher at the printer of `config`.
    pub async fn reconfigure(&self, config: &StoreConfig) -> PrintResult<()> {
        let dispatcher = PrinterDispatcher::from_store_config(config, self.timeout)?;
        info!(url = %dispatcher.base_url(), "Printer endpoint updated");
        *self.dispatcher.write().await = dispatcher;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reconfigure_swaps_endpoint() {
        let state = PrinterState::new(&StoreConfig::default(), Duration::from_secs(1)).unwrap();
        assert_eq!(state.dispatcher().await.base_url(), "http://localhost:3333");

        let config = StoreConfig {
            printer_host: "192.168.0.20".to_string(),
            printer_port: 9100,
            ..StoreConfig::default()
        };
        state.reconfigure(&config).await.unwrap();
        assert_eq!(state.dispatcher().await.base_url(), "http://192.168.0.20:9100");
    }
}
