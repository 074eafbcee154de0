//! # Cart State
//!
//! Holds the current checkout's cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                Command                 Cart Change           │
//! │  ─────────                ───────                 ───────────           │
//! │                                                                         │
//! │  Pick product + addons ──► add_to_cart() ───────► lines.push(line)     │
//! │                                                                         │
//! │  Change Quantity ────────► set_line_quantity() ─► lines[i].qty = n     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► lines.remove(i)      │
//! │                                                                         │
//! │  Click Clear ────────────► clear_cart() ────────► lines.clear()        │
//! │                                                                         │
//! │  Sale finalized ─────────► finalize_sale() ─────► lines.clear()        │
//! │                                                                         │
//! │  NOTE: Every access takes the Mutex for a short, synchronous section.  │
//! │        It is never held across an await.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use acaizen_core::{Cart, CartItem};
use serde::Serialize;

/// One cart line as the UI shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Position in the cart; what the quantity/remove commands take.
    pub index: usize,
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub addon_names: Vec<String>,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

impl CartLineView {
    pub(crate) fn from_line(index: usize, line: &CartItem) -> Self {
        CartLineView {
            index,
            product_id: line.product().id,
            name: line.product().name.clone(),
            quantity: line.quantity(),
            addon_names: line.addons().iter().map(|a| a.name.clone()).collect(),
            unit_price_cents: line.unit_price_with_addons().cents(),
            total_cents: line.total().cents(),
        }
    }
}

/// Cart response: lines plus the derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_item_count: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            lines: cart
                .lines()
                .iter()
                .enumerate()
                .map(|(index, line)| CartLineView::from_line(index, line))
                .collect(),
            total_item_count: cart.total_item_count(),
            total_cents: cart.total_amount().cents(),
        }
    }
}

/// Shared cart of this terminal.
///
/// `Arc<Mutex<_>>`: cheap to hand to every command, one writer at a time.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let view = cart_state.with_cart(|c| CartView::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acaizen_core::{Addon, Product};
    use chrono::Utc;

    fn acai() -> Product {
        Product {
            id: 1,
            name: "Açaí 300ml".to_string(),
            price_cents: 1590,
            description: String::new(),
            image: None,
            category_id: 1,
            stock: 10,
            has_addons: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn granola() -> Addon {
        Addon {
            id: 1,
            name: "Granola".to_string(),
            price_cents: 200,
            product_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_reflects_lines_and_totals() {
        let state = CartState::new();
        state
            .with_cart_mut(|c| c.add_line(&acai(), 2, &[granola()]))
            .unwrap();

        let view = state.with_cart(|c| CartView::from(c));
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].index, 0);
        assert_eq!(view.lines[0].unit_price_cents, 1790);
        assert_eq!(view.lines[0].total_cents, 3580);
        assert_eq!(view.lines[0].addon_names, vec!["Granola".to_string()]);
        assert_eq!(view.total_item_count, 2);
        assert_eq!(view.total_cents, 3580);
    }

    #[test]
    fn test_clones_share_the_same_cart() {
        let state = CartState::new();
        let other = state.clone();
        other.with_cart_mut(|c| c.add_line(&acai(), 1, &[])).unwrap();

        assert_eq!(state.with_cart(|c| c.line_count()), 1);
        assert_eq!(state.snapshot().total_amount().cents(), 1590);
    }
}
