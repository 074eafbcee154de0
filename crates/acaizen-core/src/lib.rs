//! # acaizen-core: Pure Business Logic for Açaízen POS
//!
//! This crate is the **heart** of the POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Açaízen POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               apps/terminal (commands, session state)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ acaizen-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌─────────┐          │   │
//! │  │   │  cart   │─►│checkout │─►│ receipt  │  │ report  │          │   │
//! │  │   │CartItem │  │SaleDraft│  │text/HTML │  │ ranking │          │   │
//! │  │   └─────────┘  └─────────┘  └──────────┘  └─────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     acaizen-db (SQLite)          acaizen-print (print helper)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, UserAccount, StoreConfig, ...)
//! - [`money`] - Money type with integer arithmetic and pt-BR formatting
//! - [`cart`] - Cart Aggregator
//! - [`checkout`] - Sale Finalizer validation and sale drafting
//! - [`receipt`] - Receipt Formatter (thermal text, HTML, kitchen ticket)
//! - [`report`] - Reporting Aggregator
//! - [`error`] - Domain error types
//! - [`validation`] - Input and referential-integrity rules
//!
//! ## Example Usage
//!
//! ```rust
//! use acaizen_core::money::Money;
//!
//! let price = Money::parse_decimal("15,90").unwrap();
//! assert_eq!(price.cents(), 1590);
//! assert_eq!((price * 2).to_brl(), "R$31,80");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Identity of the singleton store configuration record.
pub const STORE_CONFIG_ID: i64 = 1;

/// Category conventionally reserved for items that need kitchen preparation.
///
/// Matches the "Lanches" category created by the sample catalog. The terminal
/// configuration can point the kitchen ticket at another category.
pub const KITCHEN_CATEGORY_ID: i64 = 3;

/// Customer name stored when the cashier does not type one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Cliente";

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of lines in a single cart.
pub const MAX_CART_LINES: usize = 100;
