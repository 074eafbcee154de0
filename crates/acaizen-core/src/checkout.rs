//! # Sale Finalizer (pure half)
//!
//! Validates a checkout attempt and turns the cart into a sale draft with
//! frozen snapshots. Persistence, stock decrements and printing live in the
//! database crate and the terminal app; everything here is a pure function.
//!
//! ## Checkout State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──► Validating ──┬──► Persisting ──► ReceiptReady { sale_id }   │
//! │                         │         │                                     │
//! │                         │         └──(store failure)──► Rejected        │
//! │                         └──(empty cart / not enough cash)──► Rejected   │
//! │                                                                         │
//! │   Validating and Persisting are "busy": a second finalize request       │
//! │   is refused with CheckoutInProgress instead of running twice.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use acaizen_core::checkout::{validate_payment, PaymentInput};
//! use acaizen_core::{Money, PaymentMethod};
//!
//! let total = Money::from_cents(3580);
//! let payment = PaymentInput::cash(Money::from_cents(4000));
//! let settled = validate_payment(total, &payment).unwrap();
//! assert_eq!(settled.change_cents, Some(420));
//!
//! let pix = PaymentInput::new(PaymentMethod::Pix);
//! assert_eq!(validate_payment(total, &pix).unwrap().change_cents, None);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AddonSnapshot, PaymentMethod, Sale, SaleItem};
use crate::DEFAULT_CUSTOMER_NAME;

// =============================================================================
// Checkout State
// =============================================================================

/// Where the current checkout attempt is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Persisting,
    ReceiptReady {
        #[serde(rename = "saleId")]
        sale_id: i64,
    },
    Rejected { reason: String },
}

impl CheckoutState {
    /// True while a finalization is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, CheckoutState::Validating | CheckoutState::Persisting)
    }

    /// Moves to `Validating`, refusing if another attempt is still running.
    pub fn begin(&mut self) -> CoreResult<()> {
        if self.is_busy() {
            return Err(CoreError::CheckoutInProgress);
        }
        *self = CheckoutState::Validating;
        Ok(())
    }
}

// =============================================================================
// Payment
// =============================================================================

/// What the cashier entered in the payment dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub method: PaymentMethod,
    /// Amount handed over by the customer. Only read for cash.
    #[serde(default)]
    pub cash_received_cents: Option<i64>,
}

impl PaymentInput {
    pub fn new(method: PaymentMethod) -> Self {
        PaymentInput {
            method,
            cash_received_cents: None,
        }
    }

    pub fn cash(received: Money) -> Self {
        PaymentInput {
            method: PaymentMethod::Cash,
            cash_received_cents: Some(received.cents()),
        }
    }
}

/// A payment that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettledPayment {
    pub method: PaymentMethod,
    pub cash_received_cents: Option<i64>,
    pub change_cents: Option<i64>,
}

/// Checks the payment against the cart total.
///
/// Cash needs a received amount of at least `total`; the change is
/// `received - total`. Other methods carry neither field, even if the
/// dialog sent a received amount.
pub fn validate_payment(total: Money, payment: &PaymentInput) -> CoreResult<SettledPayment> {
    if payment.method != PaymentMethod::Cash {
        return Ok(SettledPayment {
            method: payment.method,
            cash_received_cents: None,
            change_cents: None,
        });
    }

    let received = payment.cash_received_cents.map(Money::from_cents);
    match received {
        Some(received) if received >= total => Ok(SettledPayment {
            method: PaymentMethod::Cash,
            cash_received_cents: Some(received.cents()),
            change_cents: Some((received - total).cents()),
        }),
        _ => Err(CoreError::InsufficientAmount { total, received }),
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// The operator recorded on the sale (copied, not joined later).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: String,
    pub name: String,
}

/// A validated sale that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_name: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub cash_received_cents: Option<i64>,
    pub change_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub operator_id: String,
    pub operator_name: String,
    pub items: Vec<NewSaleItem>,
}

/// A sale line with its snapshots, not stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub addons: Vec<AddonSnapshot>,
    pub total_price_cents: i64,
}

/// Validates the checkout and snapshots the cart into a [`NewSale`].
///
/// ## Rules
/// 1. Empty cart → [`CoreError::EmptyCart`]
/// 2. Payment checked with [`validate_payment`]
/// 3. Items mirror the cart lines in order with frozen name/price/addons
/// 4. A blank customer name becomes [`DEFAULT_CUSTOMER_NAME`]
pub fn draft_sale(
    cart: &Cart,
    payment: &PaymentInput,
    customer_name: Option<&str>,
    operator: &Operator,
    now: DateTime<Utc>,
) -> CoreResult<NewSale> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let total = cart.total_amount();
    let settled = validate_payment(total, payment)?;

    let items = cart
        .lines()
        .iter()
        .map(|line| NewSaleItem {
            product_id: line.product().id,
            product_name: line.product().name.clone(),
            quantity: line.quantity(),
            unit_price_cents: line.product().price_cents,
            addons: line.addons().iter().map(|a| a.snapshot()).collect(),
            total_price_cents: line.total().cents(),
        })
        .collect();

    let customer_name = customer_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_CUSTOMER_NAME)
        .to_string();

    Ok(NewSale {
        customer_name,
        total_cents: total.cents(),
        payment_method: settled.method,
        cash_received_cents: settled.cash_received_cents,
        change_cents: settled.change_cents,
        created_at: now,
        operator_id: operator.id.clone(),
        operator_name: operator.name.clone(),
        items,
    })
}

impl NewSale {
    /// Stock adjustments owed by this sale: `(product_id, quantity)` per line.
    pub fn stock_decrements(&self) -> Vec<(i64, i64)> {
        self.items.iter().map(|i| (i.product_id, i.quantity)).collect()
    }

    /// Builds the stored record once the store has assigned identities.
    ///
    /// `item_ids` must be in the same order as `self.items`.
    pub fn into_sale(self, sale_id: i64, item_ids: &[i64]) -> Sale {
        let items = self
            .items
            .into_iter()
            .zip(item_ids.iter().copied())
            .map(|(item, id)| SaleItem {
                id,
                sale_id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                addons: item.addons,
                total_price_cents: item.total_price_cents,
            })
            .collect();

        Sale {
            id: sale_id,
            customer_name: self.customer_name,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            cash_received_cents: self.cash_received_cents,
            change_cents: self.change_cents,
            items,
            created_at: self.created_at,
            operator_id: self.operator_id,
            operator_name: self.operator_name,
        }
    }
}

// =============================================================================
// Kitchen Ticket
// =============================================================================

/// A line of the kitchen sub-receipt: no prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KitchenLine {
    pub quantity: i64,
    pub name: String,
    pub addon_names: Vec<String>,
}

/// The reduced receipt sent to the kitchen for items that need preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    pub order_number: i64,
    pub customer_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<KitchenLine>,
}

/// Picks the cart lines whose product belongs to the kitchen category.
///
/// Must run before the cart is cleared: sale items do not carry a category.
pub fn kitchen_lines(cart: &Cart, kitchen_category_id: i64) -> Vec<KitchenLine> {
    cart.lines()
        .iter()
        .filter(|line| line.product().category_id == kitchen_category_id)
        .map(|line| KitchenLine {
            quantity: line.quantity(),
            name: line.product().name.clone(),
            addon_names: line.addons().iter().map(|a| a.name.clone()).collect(),
        })
        .collect()
}

impl KitchenTicket {
    /// Builds the ticket for a stored sale, or `None` when nothing needs the
    /// kitchen.
    pub fn for_sale(sale: &Sale, lines: Vec<KitchenLine>) -> Option<KitchenTicket> {
        if lines.is_empty() {
            return None;
        }
        Some(KitchenTicket {
            order_number: sale.id,
            customer_name: sale.customer_name.clone(),
            created_at: sale.created_at,
            lines,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
