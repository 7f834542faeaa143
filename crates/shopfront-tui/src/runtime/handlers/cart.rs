//! Cart mutations and checkout.

use shopfront_core::{Services, checkout};

use super::display;
use crate::common::TaskId;
use crate::events::UiEvent;

const REMOVED: &str = "Item removed from cart";

pub async fn add_to_cart(
    services: Services,
    task: TaskId,
    product_id: u64,
    quantity: u32,
    name: String,
) -> UiEvent {
    let result = services
        .cart
        .add_to_cart(product_id, quantity)
        .await
        .map_err(|e| display(&e));
    UiEvent::CartUpdated {
        task,
        result,
        success: Some(format!("Added {name} to cart!")),
    }
}

pub async fn update_cart_item(
    services: Services,
    task: TaskId,
    item_id: u64,
    quantity: i64,
) -> UiEvent {
    let result = services
        .cart
        .update_quantity(item_id, quantity)
        .await
        .map_err(|e| display(&e));
    UiEvent::CartUpdated {
        task,
        result,
        success: (quantity <= 0).then(|| REMOVED.to_string()),
    }
}

pub async fn remove_cart_item(services: Services, task: TaskId, item_id: u64) -> UiEvent {
    let result = services
        .cart
        .remove_from_cart(item_id)
        .await
        .map_err(|e| display(&e));
    UiEvent::CartUpdated {
        task,
        result,
        success: Some(REMOVED.to_string()),
    }
}

pub async fn refresh_cart_count(services: Services) -> UiEvent {
    UiEvent::CartCount(services.cart.update_cart_count().await)
}

pub async fn checkout(services: Services, task: TaskId) -> UiEvent {
    let result = checkout::place_order(&services.api, &services.cart, &services.catalog, None)
        .await
        .map_err(|e| display(&e));
    UiEvent::OrderPlaced { task, result }
}
