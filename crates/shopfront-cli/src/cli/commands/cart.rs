//! Cart and checkout command handlers.

use anyhow::{Context, Result, bail};
use shopfront_core::Services;
use shopfront_core::cart::{CartSummary, CartView};
use shopfront_core::checkout;
use shopfront_core::format::{format_price, truncate};

pub async fn show(services: &Services) -> Result<()> {
    let view = services
        .cart
        .load_cart(&services.catalog)
        .await
        .context("load cart")?;
    print!("{}", render_cart(&view));
    Ok(())
}

pub async fn add(services: &Services, product_id: u64, quantity: u32) -> Result<()> {
    let product = services.catalog.lookup(product_id);
    if let Some(product) = product.as_ref().filter(|p| !p.in_stock()) {
        bail!("{} is out of stock", product.name);
    }

    let count = services
        .cart
        .add_to_cart(product_id, quantity)
        .await
        .context("add to cart")?;

    let name = product.map_or_else(|| format!("Product #{product_id}"), |p| p.name);
    println!("Added {name} to cart! ({})", items_label(count));
    Ok(())
}

pub async fn update(services: &Services, item_id: u64, quantity: i64) -> Result<()> {
    let count = services
        .cart
        .update_quantity(item_id, quantity)
        .await
        .context("update cart")?;
    if quantity <= 0 {
        println!("Item removed from cart ({})", items_label(count));
    } else {
        println!("Cart updated ({})", items_label(count));
    }
    Ok(())
}

pub async fn remove(services: &Services, item_id: u64) -> Result<()> {
    let count = services
        .cart
        .remove_from_cart(item_id)
        .await
        .context("remove from cart")?;
    println!("Item removed from cart ({})", items_label(count));
    Ok(())
}

pub async fn sync(services: &Services) -> Result<()> {
    if !services.cart.is_remote() {
        bail!("Please log in to sync your cart");
    }
    let report = services
        .cart
        .sync_cart_on_login()
        .await
        .context("sync cart")?;
    if report.synced == 0 {
        println!("Nothing to sync");
    } else {
        println!("Moved {} item(s) from your guest cart", report.synced);
    }
    Ok(())
}

pub async fn clear(services: &Services) -> Result<()> {
    let count = services
        .cart
        .clear_local_cart()
        .await
        .context("clear guest cart")?;
    println!("Guest cart cleared ({})", items_label(count));
    Ok(())
}

pub async fn checkout(services: &Services) -> Result<()> {
    let confirmation =
        checkout::place_order(&services.api, &services.cart, &services.catalog, None).await?;
    println!(
        "Order #{} placed ({})",
        confirmation.id, confirmation.status
    );
    if let Some(message) = confirmation.message.as_deref().filter(|m| !m.is_empty()) {
        println!("{message}");
    }
    Ok(())
}

fn items_label(count: u32) -> String {
    if count == 1 {
        "1 item in cart".to_string()
    } else {
        format!("{count} items in cart")
    }
}

fn render_cart(view: &CartView) -> String {
    if view.is_empty() {
        return "Your cart is empty\n".to_string();
    }

    let mut out = String::new();
    for line in &view.lines {
        let price = line
            .unit_price
            .map_or_else(|| "-".to_string(), format_price);
        out.push_str(&format!(
            "{:>4}  {:<28} {:>10} x {:<3} {:>10}\n",
            line.item_id,
            truncate(&line.name, 25),
            price,
            line.quantity,
            format_price(line.line_total())
        ));
    }

    let summary = view.summary();
    out.push('\n');
    out.push_str(&format!("Subtotal: {}\n", format_price(summary.subtotal)));
    out.push_str(&format!("Shipping: {}\n", CartSummary::SHIPPING_LABEL));
    out.push_str(&format!("Total:    {}\n", format_price(summary.total)));
    if view.is_local {
        out.push_str("\nGuest cart: run `shopfront login` to checkout.\n");
    }
    out
}
