//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Finalized│       │
//! │  │  Cart    │     │          │     │  Dialog  │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart       finalize_sale                      │
//! │                   set_line_quantity (sale.rs)                          │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are addressed by index. The same product added twice is two lines.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartLineView, CartState, CartView, DbState};

/// Result of removing a line: the removed line (for the notification) and
/// the cart after removal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineResponse {
    pub removed: Option<CartLineView>,
    pub cart: CartView,
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartView {
    debug!("get_cart command");
    cart.with_cart(|c| CartView::from(c))
}

/// Adds a line for a product with the selected addons.
///
/// ## Flow
/// ```text
/// add_to_cart(product 1, qty 2, addons [3, 4])
///      │
///      ├─ load product 1 (NotFound if missing)
///      ├─ load addons 3, 4 (NotFound if any is missing)
///      └─ cart.add_line: copies product + addons, computes the line total
/// ```
///
/// ## Arguments
/// * `quantity` - defaults to 1
/// * `addon_ids` - selected addons; must belong to the product
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    product_id: i64,
    quantity: Option<i64>,
    addon_ids: &[i64],
) -> Result<CartView, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id, quantity, addons = addon_ids.len(), "add_to_cart command");

    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let addons = db.inner().addons().get_many(addon_ids).await?;

    cart.with_cart_mut(|c| {
        c.add_line(&product, quantity, &addons)?;
        Ok::<CartView, ApiError>(CartView::from(&*c))
    })
}

/// Sets the quantity of one line.
///
/// A quantity below 1 or an index past the end leaves the cart unchanged.
pub fn set_line_quantity(cart: &CartState, index: usize, quantity: i64) -> CartView {
    debug!(index, quantity, "set_line_quantity command");
    cart.with_cart_mut(|c| {
        c.set_line_quantity(index, quantity);
        CartView::from(&*c)
    })
}

/// Removes one line and returns it.
pub fn remove_from_cart(cart: &CartState, index: usize) -> RemoveLineResponse {
    debug!(index, "remove_from_cart command");
    cart.with_cart_mut(|c| {
        let removed = c
            .remove_line(index)
            .map(|line| CartLineView::from_line(index, &line));
        RemoveLineResponse {
            removed,
            cart: CartView::from(&*c),
        }
    })
}

/// Clears all lines (the cashier cancelled the order).
pub fn clear_cart(cart: &CartState) -> CartView {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| {
        c.clear();
        CartView::from(&*c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{product_named, test_context};

    #[tokio::test]
    async fn test_add_line_with_addons() {
        let ctx = test_context().await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;
        let addons = ctx.db.inner().addons().list_for_product(acai.id).await.unwrap();
        let granola = addons.iter().find(|a| a.name == "Granola").unwrap();

        let view = add_to_cart(&ctx.db, &ctx.cart, acai.id, Some(2), &[granola.id])
            .await
            .unwrap();

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].total_cents, 3580);
        assert_eq!(view.total_cents, 3580);
        assert_eq!(view.total_item_count, 2);
    }

    #[tokio::test]
    async fn test_same_product_twice_gives_two_lines() {
        let ctx = test_context().await;
        let soda = product_named(&ctx, "Refrigerante Lata").await;

        add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();
        let view = add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.total_cents, 1000);
    }

    #[tokio::test]
    async fn test_unknown_product_and_foreign_addon() {
        let ctx = test_context().await;
        let err = add_to_cart(&ctx.db, &ctx.cart, 9999, None, &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let soda = product_named(&ctx, "Refrigerante Lata").await;
        let acai = product_named(&ctx, "Açaí Tradicional 300ml").await;
        let acai_addon = ctx.db.inner().addons().list_for_product(acai.id).await.unwrap()[0].id;

        let err = add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[acai_addon])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(get_cart(&ctx.cart).lines.is_empty());
    }

    #[tokio::test]
    async fn test_quantity_remove_and_clear() {
        let ctx = test_context().await;
        let soda = product_named(&ctx, "Refrigerante Lata").await;
        let juice = product_named(&ctx, "Suco Natural").await;
        add_to_cart(&ctx.db, &ctx.cart, soda.id, None, &[]).await.unwrap();
        add_to_cart(&ctx.db, &ctx.cart, juice.id, None, &[]).await.unwrap();

        let view = set_line_quantity(&ctx.cart, 0, 3);
        assert_eq!(view.total_cents, 3 * 500 + 800);

        // Out of range and below 1 are ignored
        assert_eq!(set_line_quantity(&ctx.cart, 7, 2), view);
        assert_eq!(set_line_quantity(&ctx.cart, 0, 0), view);

        let response = remove_from_cart(&ctx.cart, 0);
        assert_eq!(response.removed.unwrap().name, "Refrigerante Lata");
        assert_eq!(response.cart.lines.len(), 1);
        assert_eq!(response.cart.lines[0].index, 0);
        assert!(remove_from_cart(&ctx.cart, 5).removed.is_none());

        assert!(clear_cart(&ctx.cart).lines.is_empty());
    }
}
