//! Admin dashboard command handlers.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use shopfront_core::Services;
use shopfront_core::api::types::MetricsSnapshot;
use shopfront_core::format::format_price;

pub async fn summary(services: &Services) -> Result<()> {
    let summary = services
        .api
        .get_dashboard_summary()
        .await
        .context("load dashboard summary")?;

    println!("Online users:     {}", count(summary.online_users));
    println!("Requests/min:     {}", count(summary.requests_per_min));
    println!("Orders today:     {}", count(summary.orders_today));
    println!("Revenue today:    {}", revenue(summary.revenue_today));
    println!("Total users:      {}", count(summary.total_users));
    Ok(())
}

/// Prints one line per metrics event until the stream ends or `limit` is hit.
pub async fn metrics(services: &Services, limit: Option<usize>) -> Result<()> {
    let mut stream = services
        .api
        .metrics_stream()
        .await
        .context("open metrics stream")?;

    let mut seen = 0;
    while let Some(item) = stream.next().await {
        let snapshot = item.context("read metrics stream")?;
        println!("{}", metrics_line(&snapshot));
        seen += 1;
        if limit.is_some_and(|limit| seen >= limit) {
            return Ok(());
        }
    }

    eprintln!("Live metrics disconnected");
    Ok(())
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn revenue(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_price)
}

fn metrics_line(snapshot: &MetricsSnapshot) -> String {
    format!(
        "online {}  req/min {}  orders {}  revenue {}",
        count(snapshot.online_users),
        count(snapshot.requests_per_min),
        count(snapshot.orders_today),
        revenue(snapshot.revenue_today)
    )
}
