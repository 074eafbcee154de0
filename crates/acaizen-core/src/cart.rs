//! # Cart Aggregator
//!
//! The ephemeral, pre-finalization collection of selected lines.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action            Operation                State Change        │
//! │  ──────────────            ─────────                ────────────        │
//! │                                                                         │
//! │  Pick product + addons ──► add_line() ───────────► lines.push(line)     │
//! │                                                                         │
//! │  Change quantity ────────► set_line_quantity() ──► lines[i].qty = n     │
//! │                                                     (no-op if i absent) │
//! │                                                                         │
//! │  Click remove ───────────► remove_line() ────────► lines.remove(i)      │
//! │                                                                         │
//! │  Sale finalized ─────────► clear() ──────────────► lines.clear()        │
//! │                                                                         │
//! │  total_item_count() / total_amount(): summed on every read, no cache    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Pricing
//! `total = (product price + Σ addon prices) × quantity`, recomputed by every
//! mutation. The field is private so nothing else can set it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Addon, Product};
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart.
///
/// Holds a copy of the product and of the selected addons as they were when
/// the line was added, so later catalog edits do not change an open cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    product: Product,
    quantity: i64,
    addons: Vec<Addon>,
    total_cents: i64,
}

impl CartItem {
    fn new(product: Product, quantity: i64, addons: Vec<Addon>) -> Self {
        let mut item = CartItem {
            product,
            quantity,
            addons,
            total_cents: 0,
        };
        item.recompute();
        item
    }

    fn recompute(&mut self) {
        self.total_cents = self.unit_price_with_addons().multiply_quantity(self.quantity).cents();
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn addons(&self) -> &[Addon] {
        &self.addons
    }

    /// Product price plus the price of every selected addon.
    pub fn unit_price_with_addons(&self) -> Money {
        self.product.price() + self.addons.iter().map(Addon::price).sum::<Money>()
    }

    /// Line total as last computed by a mutation.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The current checkout's cart.
///
/// ## Invariants
/// - Lines are never merged: adding the same product twice gives two lines
/// - Every line's quantity is between 1 and [`MAX_ITEM_QUANTITY`]
/// - At most [`MAX_CART_LINES`] lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Appends a line for `product` with the selected addons.
    ///
    /// Addons are a set: a repeated addon id is kept once, in first-selected
    /// order.
    ///
    /// ## Errors
    /// - quantity below 1 or above [`MAX_ITEM_QUANTITY`]
    /// - cart already holds [`MAX_CART_LINES`] lines
    /// - an addon that belongs to another product
    pub fn add_line(&mut self, product: &Product, quantity: i64, addons: &[Addon]) -> CoreResult<()> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }

        let mut selected: Vec<Addon> = Vec::with_capacity(addons.len());
        for addon in addons {
            if addon.product_id != product.id {
                return Err(CoreError::AddonNotForProduct {
                    addon_id: addon.id,
                    product_id: product.id,
                });
            }
            if !selected.iter().any(|a| a.id == addon.id) {
                selected.push(addon.clone());
            }
        }

        self.lines.push(CartItem::new(product.clone(), quantity, selected));
        Ok(())
    }

    /// Sets the quantity of the line at `index` and recomputes its total.
    ///
    /// Does nothing when the index is out of range or the quantity is outside
    /// `1..=MAX_ITEM_QUANTITY`.
    pub fn set_line_quantity(&mut self, index: usize, quantity: i64) {
        if validate_quantity(quantity).is_err() {
            return;
        }
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
            line.recompute();
        }
    }

    /// Removes the line at `index`, returning it so the caller can name it in
    /// a notification.
    pub fn remove_line(&mut self, index: usize) -> Option<CartItem> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Removes the lines of a sold snapshot of this cart.
    ///
    /// Only the leading lines still equal to `sold`'s lines go; lines added
    /// or changed after the snapshot was taken stay in the cart. Returns how
    /// many lines were removed.
    pub fn remove_sold(&mut self, sold: &Cart) -> usize {
        let count = self
            .lines
            .iter()
            .zip(&sold.lines)
            .take_while(|(line, sold_line)| line == sold_line)
            .count();
        self.lines.drain(..count);
        count
    }

    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of the quantities of every line.
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of every line total.
    pub fn total_amount(&self) -> Money {
        self.lines.iter().map(CartItem::total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
