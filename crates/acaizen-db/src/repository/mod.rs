//! # Repository Module
//!
//! Database repository implementations for Açaízen POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Terminal command                                                      │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(draft)                                 │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── record_sale(&self, draft)                                         │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── list_all(&self)                                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Business rules (category in use, last admin, ...) come from           │
//! │  acaizen_core::validation and are checked here before writing.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and stock
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`AddonRepository`](addon::AddonRepository) - Product addons
//! - [`SaleRepository`](sale::SaleRepository) - The sales log
//! - [`UserRepository`](user::UserRepository) - Operator accounts and login
//! - [`StoreConfigRepository`](config::StoreConfigRepository) - Store settings

pub mod addon;
pub mod category;
pub mod config;
pub mod product;
pub mod sale;
pub mod user;
