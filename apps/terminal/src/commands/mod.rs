//! # Terminal Commands
//!
//! One async function per UI action. A UI shell (desktop window, web view,
//! or the CLI in `main.rs`) calls these and renders the result or the
//! [`ApiError`](crate::error::ApiError).
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── sale.rs      ◄─── Sale finalization, sale history
//! ├── receipt.rs   ◄─── Reprint, print helper, print dialog, download
//! ├── catalog.rs   ◄─── Products, categories, addons, product CSV
//! ├── users.rs     ◄─── Login/logout, user accounts
//! ├── reports.rs   ◄─── Sales report + CSV export
//! └── settings.rs  ◄─── Store settings, printer test, backup
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> CartView
//!
//! // Needs database and cart
//! async fn add_to_cart(db: &DbState, cart: &CartState, ...)
//!
//! // Checkout touches everything
//! async fn finalize_sale(db, cart, session, printer, settings, request)
//! ```

pub mod cart;
pub mod catalog;
pub mod receipt;
pub mod reports;
pub mod sale;
pub mod settings;
pub mod users;
