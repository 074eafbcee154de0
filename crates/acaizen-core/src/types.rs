//! # Domain Types
//!
//! Core domain types used throughout Açaízen POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog Store                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐                   │
//! │  │  Category   │◄──│   Product   │◄──│    Addon    │                   │
//! │  │  id (i64)   │   │  id (i64)   │   │  id (i64)   │                   │
//! │  │  name       │   │  price      │   │  price      │                   │
//! │  └─────────────┘   │  stock      │   │  product_id │                   │
//! │                    └─────────────┘   └─────────────┘                   │
//! │                                                                         │
//! │  Sales log (immutable once written)                                     │
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐                 │
//! │  │    Sale     │──►│  SaleItem   │──►│ AddonSnapshot │                 │
//! │  │  id (i64)   │   │  name snap  │   │  name, price  │                 │
//! │  │  total      │   │  price snap │   │  (frozen)     │                 │
//! │  │  method     │   └─────────────┘   └───────────────┘                 │
//! │  └─────────────┘                                                        │
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────┐                                      │
//! │  │ StoreConfig │   │ UserAccount │                                      │
//! │  │ singleton   │   │ id (UUID)   │                                      │
//! │  └─────────────┘   └─────────────┘                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Products, categories, addons and sales use auto-incrementing integer ids
//! assigned by the store. User accounts use a string id. The store config is
//! a singleton with the fixed id [`crate::STORE_CONFIG_ID`].

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category (Açaí, Bebidas, Lanches, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Unit price in centavos (never negative).
    pub price_cents: i64,

    pub description: String,

    /// Optional image reference (URL or data URI).
    pub image: Option<String>,

    pub category_id: i64,

    /// Stock count. May go negative: sales never check or floor it.
    pub stock: i64,

    /// Whether addons can be selected for this product.
    pub has_addons: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Addon
// =============================================================================

/// An optional priced modifier attachable to a product (Granola, Leite Ninho, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    /// Owning product. Deleting the product deletes its addons.
    pub product_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Addon {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Freezes the addon for storage inside a sale.
    pub fn snapshot(&self) -> AddonSnapshot {
        AddonSnapshot {
            id: self.id,
            name: self.name.clone(),
            price_cents: self.price_cents,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash. The only method with a received amount and change.
    Cash,
    Credit,
    Debit,
    Pix,
}

impl PaymentMethod {
    /// Every method, in the order reports list them.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Credit,
        PaymentMethod::Debit,
        PaymentMethod::Pix,
    ];

    /// Wire/storage code (`cash`, `credit`, `debit`, `pix`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Pix => "pix",
        }
    }

    /// Short label used by reports and their CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Credit => "Crédito",
            PaymentMethod::Debit => "Débito",
            PaymentMethod::Pix => "PIX",
        }
    }

    /// Label printed on receipts.
    pub fn receipt_label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Credit => "Cartão de Crédito",
            PaymentMethod::Debit => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
        }
    }

    /// Parses the storage code, case-insensitively.
    pub fn parse(code: &str) -> Option<PaymentMethod> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(code.trim()))
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale. Immutable once its items are attached.
///
/// ## Invariants
/// - `total_cents` equals the sum of `items[*].total_price_cents`
/// - `cash_received_cents` and `change_cents` are `Some` only for cash
/// - operator identity and name are copied at sale time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    pub customer_name: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub cash_received_cents: Option<i64>,
    pub change_cents: Option<i64>,

    /// Line items in cart order. Loaded separately from the header.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub operator_id: String,
    pub operator_name: String,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Option<Money> {
        self.change_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn cash_received(&self) -> Option<Money> {
        self.cash_received_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Addons at time of sale (frozen), in selection order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub addons: Vec<AddonSnapshot>,
    /// (unit price + sum of addon prices) × quantity.
    pub total_price_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// An addon as it was when the sale happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonSnapshot {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

impl AddonSnapshot {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Store display/contact info and the print helper endpoint.
///
/// Singleton: created with [`StoreConfig::default`] on first read, then
/// read-modify-write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub id: i64,
    pub store_name: String,
    pub address: String,
    pub phone: String,
    pub instagram: String,
    pub facebook: String,
    pub printer_host: String,
    pub printer_port: i64,
    /// Local time offset used for receipt dates and report day boundaries.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i64,
}

/// Brasília time (UTC-3).
pub const DEFAULT_UTC_OFFSET_MINUTES: i64 = -180;

/// Port the print helper listens on when none is configured.
pub const DEFAULT_PRINTER_PORT: i64 = 3333;

fn default_utc_offset_minutes() -> i64 {
    DEFAULT_UTC_OFFSET_MINUTES
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            id: crate::STORE_CONFIG_ID,
            store_name: "Açaízen SmartHUB".to_string(),
            address: "Rua Arthur Oscar, 220 - Vila Nova, Mansa - RJ".to_string(),
            phone: "(24) 9933-9007".to_string(),
            instagram: "@acaizenn".to_string(),
            facebook: "@açaizen".to_string(),
            printer_host: "localhost".to_string(),
            printer_port: DEFAULT_PRINTER_PORT,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl StoreConfig {
    /// Base URL of the print helper (`http://host:port`).
    ///
    /// A blank host falls back to `localhost`, a non-positive port to 3333.
    pub fn printer_base_url(&self) -> String {
        let host = self.printer_host.trim();
        let host = if host.is_empty() { "localhost" } else { host };
        let port = if self.printer_port > 0 {
            self.printer_port
        } else {
            DEFAULT_PRINTER_PORT
        };
        format!("http://{}:{}", host, port)
    }

    /// The configured offset as a chrono timezone. Out-of-range values
    /// fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        i32::try_from(self.utc_offset_minutes.saturating_mul(60))
            .ok()
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

// =============================================================================
// User Account
// =============================================================================

/// Operator role.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Cashier => "cashier",
        }
    }
}

/// An operator account.
///
/// The password is stored in plaintext. This is a known weakness kept
/// because the backup file format carries it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Input Types (create / update forms)
// =============================================================================

/// Fields of the product form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub has_addons: bool,
}

/// Fields of the category form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields of the addon form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonInput {
    pub name: String,
    pub price_cents: i64,
    pub product_id: i64,
}

/// Fields of the user form.
///
/// On update a blank password keeps the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

// =============================================================================
// Unit Tests
// =============================================================================
