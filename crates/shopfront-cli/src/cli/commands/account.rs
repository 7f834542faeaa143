//! Session and account command handlers.

use anyhow::{Context, Result, bail};
use shopfront_core::Services;
use shopfront_core::api::types::Order;
use shopfront_core::auth::LoginOutcome;
use shopfront_core::format::{format_date, format_price};

/// Orders shown per `orders list` page.
const ORDERS_PAGE_SIZE: u32 = 10;

pub async fn login(services: &Services, email: &str, password: &str) -> Result<()> {
    let outcome = services.auth.login(email, password).await?;
    report_login(&outcome);
    Ok(())
}

pub async fn register(
    services: &Services,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<()> {
    let outcome = services.auth.register(email, password, full_name).await?;
    report_login(&outcome);
    Ok(())
}

fn report_login(outcome: &LoginOutcome) {
    println!("Welcome, {}!", outcome.user.display_name());
    if outcome.sync.synced > 0 {
        println!(
            "Moved {} item(s) from your guest cart",
            outcome.sync.synced
        );
    }
    if let Some(error) = &outcome.sync_error {
        eprintln!("Could not sync your cart: {error}");
    }
    println!("Cart: {} item(s)", outcome.cart_count);
}

pub async fn logout(services: &Services) -> Result<()> {
    if !services.api.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    services.auth.logout().await.context("log out")?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(services: &Services) -> Result<()> {
    let user = services
        .api
        .current_user()
        .filter(|_| services.api.is_authenticated());
    let Some(user) = user else {
        println!("Not logged in");
        return Ok(());
    };

    let profile = services.api.get_profile().await.context("load profile")?;
    match profile.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => println!("{name} <{}>", profile.email),
        None => println!("{}", profile.email),
    }
    println!("User id: {}", user.id);
    Ok(())
}

pub async fn orders(services: &Services, page: u32) -> Result<()> {
    require_login(services, "Please log in to view your orders")?;

    let orders = services
        .api
        .get_orders(page.saturating_sub(1), ORDERS_PAGE_SIZE)
        .await
        .context("load orders")?;
    if orders.content.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders.content {
        println!("{}", order_row(order));
    }
    if orders.total_pages > 1 {
        println!(
            "Page {} of {} ({} orders)",
            orders.number.saturating_add(1),
            orders.total_pages,
            orders.total_elements
        );
    }
    Ok(())
}

pub async fn order(services: &Services, order_id: u64) -> Result<()> {
    require_login(services, "Please log in to view your orders")?;

    let order = services
        .api
        .get_order(order_id)
        .await
        .with_context(|| format!("load order #{order_id}"))?;

    println!("{}", order_row(&order));
    for item in &order.items {
        println!(
            "  {} x {} @ {} = {}",
            item.quantity,
            item.name,
            format_price(item.unit_price),
            format_price(item.line_total)
        );
    }
    Ok(())
}

fn require_login(services: &Services, message: &str) -> Result<()> {
    if !services.api.is_authenticated() {
        bail!("{message}");
    }
    Ok(())
}

fn order_row(order: &Order) -> String {
    let date = order
        .created_at
        .as_deref()
        .map_or_else(String::new, format_date);
    let total = order.total.map_or_else(String::new, format_price);
    format!("#{:<6} {:<20} {:<12} {}", order.id, date, order.status, total)
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use shopfront_core::api::types::OrderItem;

    use super::*;

    #[test]
    fn test_order_row_formats_date_and_total() {
        let order = Order {
            id: 17,
            status: "PENDING".to_string(),
            total: Some(1234.5),
            items: vec![OrderItem {
                name: "Mug".to_string(),
                quantity: 1,
                unit_price: 1234.5,
                line_total: 1234.5,
            }],
            created_at: Some("2024-03-05T10:00:00Z".to_string()),
        };
        let row = order_row(&order);
        assert!(row.starts_with("#17"));
        assert!(row.contains("March 5, 2024"));
        assert!(row.contains("PENDING"));
        assert!(row.ends_with("$1,234.50"));
    }

    #[test]
    fn test_order_row_without_optional_fields() {
        let order = Order {
            id: 3,
            status: "SHIPPED".to_string(),
            total: None,
            items: Vec::new(),
            created_at: None,
        };
        assert!(order_row(&order).ends_with("SHIPPED"));
    }
}
