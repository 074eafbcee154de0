//! # State Module
//!
//! Session-scoped state of one terminal.
//!
//! Each concern gets its own type so a command declares exactly what it
//! touches. Everything is created once at startup and lives as long as the
//! process.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   DbState    │ │  CartState   │ │ SessionState │ │ PrinterState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │  Database    │ │  Arc<Mutex<  │ │  operator    │ │  dispatcher  │   │
//! │  │  (SQLite     │ │    Cart      │ │  checkout    │ │  (rebuilt on │   │
//! │  │   pool)      │ │  >>          │ │  state       │ │  settings)   │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartState / SessionState: short Mutex sections, never across await  │
//! │  • PrinterState: tokio RwLock, swapped when store settings change      │
//! │  • TerminalConfig: read-only after startup                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod printer;
mod session;

pub use cart::{CartLineView, CartState, CartView};
pub use config::{
    CheckoutSettings, ConfigError, ConfigResult, DatabaseSettings, LogFormat, LoggingSettings,
    PrinterSettings, ReceiptSettings, TerminalConfig, CONFIG_FILE_NAME,
};
pub use db::DbState;
pub use printer::PrinterState;
pub use session::SessionState;
