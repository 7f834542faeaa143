//! Checkout: turns the server cart into an order.
//!
//! No payment is taken; the backend records the order as pending.

use anyhow::{Result, bail};

use crate::api::ApiClient;
use crate::api::types::{CreateOrderRequest, OrderConfirmation, OrderLineRequest, ShippingAddress};
use crate::cart::{CartManager, CartView};
use crate::catalog::Catalog;

/// Builds the order body from displayed cart lines.
///
/// # Errors
/// Returns an error if the cart is empty or a line has no product id.
pub fn build_order(
    view: &CartView,
    shipping_address: Option<ShippingAddress>,
) -> Result<CreateOrderRequest> {
    if view.is_empty() {
        bail!("Your cart is empty");
    }

    let items = view
        .lines
        .iter()
        .map(|line| match line.product_id {
            Some(product_id) => Ok(OrderLineRequest {
                product_id,
                quantity: line.quantity,
            }),
            None => bail!("Cart item {} has no product", line.item_id),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CreateOrderRequest {
        items,
        total: view.summary().total,
        shipping_address,
    })
}

/// Places an order for the current server cart.
///
/// # Errors
/// Returns an error when not logged in, when the cart is empty, or when the
/// server rejects the order.
pub async fn place_order(
    api: &ApiClient,
    cart: &CartManager,
    catalog: &Catalog,
    shipping_address: Option<ShippingAddress>,
) -> Result<OrderConfirmation> {
    if !api.is_authenticated() {
        bail!("Please log in to checkout");
    }

    let view = cart.load_cart(catalog).await?;
    let order = build_order(&view, shipping_address)?;
    let confirmation = api.create_order(&order).await?;
    tracing::info!(order_id = confirmation.id, status = %confirmation.status, "order placed");

    cart.update_cart_count().await;
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;

    fn line(item_id: u64, product_id: Option<u64>, price: f64, quantity: u32) -> CartLine {
        CartLine {
            item_id,
            product_id,
            name: format!("Item {item_id}"),
            unit_price: Some(price),
            quantity,
            product: None,
        }
    }

    #[test]
    fn test_build_order_totals_lines() {
        let view = CartView {
            lines: vec![line(1, Some(10), 2.5, 2), line(2, Some(11), 1.0, 3)],
            is_local: false,
        };
        let order = build_order(&view, None).unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].product_id, 11);
        assert!((order.total - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let err = build_order(&CartView::default(), None).unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty");
    }

    #[test]
    fn test_build_order_requires_product_ids() {
        let view = CartView {
            lines: vec![line(5, None, 1.0, 1)],
            is_local: false,
        };
        assert!(build_order(&view, None).is_err());
    }
}
