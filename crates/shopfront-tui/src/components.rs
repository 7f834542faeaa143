//! Pure view components: data in, styled lines out.
//!
//! Nothing here touches state or the terminal, so every component can be
//! checked by inspecting the text it produces.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use shopfront_core::api::types::{Category, MetricsSnapshot, Order, Product, Review};
use shopfront_core::cart::{CartLine, CartSummary};
use shopfront_core::catalog::ListingQuery;
use shopfront_core::format::{format_date, format_price, stars, truncate};

use crate::common::pad_to_width;

/// Products with at most this much stock get a "low stock" badge.
const LOW_STOCK: i64 = 5;
/// Page links shown on each side of the current page.
const PAGE_WINDOW: u32 = 2;

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

pub fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn stock_badge(product: &Product) -> Span<'static> {
    match product.stock() {
        s if s <= 0 => Span::styled("Out of Stock", Style::default().fg(Color::Red)),
        s if s <= LOW_STOCK => Span::styled(
            format!("Only {s} left"),
            Style::default().fg(Color::Yellow),
        ),
        _ => Span::styled("In Stock", Style::default().fg(Color::Green)),
    }
}

/// One product in a list: name, price, rating with review count, stock.
pub fn product_row(product: &Product, width: u16, selected: bool) -> Line<'static> {
    let name_width = (width as usize).saturating_sub(44).max(12);
    let marker = if selected { "▸ " } else { "  " };
    let base = selected_style(selected);

    Line::from(vec![
        Span::styled(marker, base.fg(Color::Cyan)),
        Span::styled(pad_to_width(&product.name, name_width), base),
        Span::styled(
            format!("{:>11} ", format_price(product.price)),
            base.fg(Color::Green),
        ),
        Span::styled(stars(product.rating()), base.fg(Color::Yellow)),
        Span::styled(
            format!(" ({}) ", product.reviews()),
            base.fg(Color::DarkGray),
        ),
        stock_badge(product),
    ])
}

/// The description line shown under the selected product.
pub fn product_blurb(product: &Product) -> Line<'static> {
    Line::from(Span::styled(
        format!("    {}", truncate(product.description(), 100)),
        Style::default().fg(Color::Gray),
    ))
}

pub fn category_row(index: usize, category: &Category) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {} ", index + 1), Style::default().fg(Color::Cyan)),
        Span::raw(category.name.clone()),
        Span::styled(
            format!("  {} products", category.product_count.unwrap_or(0)),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// Filters summary above the product list.
pub fn filter_bar(query: &ListingQuery, categories: &[Category]) -> Line<'static> {
    let filter = query.filter();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let search = filter
        .search
        .as_deref()
        .map_or_else(|| "any".to_string(), |s| format!("\"{s}\""));
    let category = filter.category.map_or_else(
        || "All".to_string(),
        |id| {
            categories
                .iter()
                .find(|c| c.id == id)
                .map_or_else(|| format!("#{id}"), |c| c.name.clone())
        },
    );
    let bound = |b: Option<f64>| b.map_or_else(|| "…".to_string(), format_price);
    let price = if filter.min_price.is_none() && filter.max_price.is_none() {
        "any".to_string()
    } else {
        format!("{} – {}", bound(filter.min_price), bound(filter.max_price))
    };

    Line::from(vec![
        Span::styled("Search: ", label),
        Span::styled(search, value),
        Span::styled("  Category: ", label),
        Span::styled(category, value),
        Span::styled("  Price: ", label),
        Span::styled(price, value),
        Span::styled("  Sort: ", label),
        Span::styled(filter.sort.label().to_string(), value),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous,
    /// Zero-based page index.
    Page { index: u32, current: bool },
    Next,
}

/// Pagination links: Previous (unless first), pages `current ± 2`, Next
/// (unless last). Empty when there is at most one page.
pub fn pagination(current: u32, total_pages: u32) -> Vec<PageLink> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.min(total_pages - 1);
    let mut links = Vec::new();
    if current > 0 {
        links.push(PageLink::Previous);
    }
    let start = current.saturating_sub(PAGE_WINDOW);
    let end = current.saturating_add(PAGE_WINDOW).min(total_pages - 1);
    for index in start..=end {
        links.push(PageLink::Page {
            index,
            current: index == current,
        });
    }
    if current < total_pages - 1 {
        links.push(PageLink::Next);
    }
    links
}

pub fn pagination_line(links: &[PageLink]) -> Line<'static> {
    let spans = links
        .iter()
        .flat_map(|link| {
            let span = match link {
                PageLink::Previous => {
                    Span::styled("‹ Previous (N)", Style::default().fg(Color::Cyan))
                }
                PageLink::Next => Span::styled("Next (n) ›", Style::default().fg(Color::Cyan)),
                PageLink::Page {
                    index,
                    current: true,
                } => Span::styled(
                    format!("[{}]", index + 1),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                PageLink::Page { index, .. } => Span::raw(format!(" {} ", index + 1)),
            };
            [span, Span::raw(" ")]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Empty listing: a message, and a way out when filters are active.
pub fn empty_state(message: &str, action: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No items found",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];
    if let Some(action) = action {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            action.to_string(),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines
}

/// Product detail header block.
pub fn product_detail(product: &Product) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(stars(product.rating()), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!(" {:.1} ({} reviews)", product.rating(), product.reviews()),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format_price(product.price),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            stock_badge(product),
        ]),
    ];
    if let Some(category) = &product.category {
        lines.push(Line::from(Span::styled(
            format!("Category: {}", category.name),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(product.description().to_string()));
    lines
}

pub fn review(review: &Review) -> Vec<Line<'static>> {
    let mut header = vec![
        Span::styled(
            review.author().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            stars(f64::from(review.rating)),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if let Some(date) = &review.created_at {
        header.push(Span::styled(
            format!("  {}", format_date(date)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![Line::from(header)];
    if let Some(title) = review.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(review.body.clone()));
    lines.push(Line::from(""));
    lines
}

/// One cart line: name, unit price, quantity stepper, line total.
pub fn cart_line(line: &CartLine, width: u16, selected: bool) -> Line<'static> {
    let name_width = (width as usize).saturating_sub(42).max(12);
    let marker = if selected { "▸ " } else { "  " };
    let base = selected_style(selected);
    let unit = line
        .unit_price
        .map_or_else(|| "-".to_string(), format_price);

    Line::from(vec![
        Span::styled(marker, base.fg(Color::Cyan)),
        Span::styled(pad_to_width(&line.name, name_width), base),
        Span::styled(format!("{unit:>11} "), base.fg(Color::Gray)),
        Span::styled(format!(" − {:>3} + ", line.quantity), base),
        Span::styled(
            format!("{:>12}", format_price(line.line_total())),
            base.fg(Color::Green),
        ),
    ])
}

pub fn cart_summary(summary: &CartSummary) -> Vec<Line<'static>> {
    let row = |label: &str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
            Span::styled(value, style),
        ])
    };
    vec![
        section_title("Order Summary"),
        row("Subtotal", format_price(summary.subtotal), Style::default()),
        row(
            "Shipping",
            CartSummary::SHIPPING_LABEL.to_string(),
            Style::default().fg(Color::Green),
        ),
        row(
            "Total",
            format_price(summary.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]
}

pub fn order_row(order: &Order, selected: bool) -> Line<'static> {
    let base = selected_style(selected);
    let date = order
        .created_at
        .as_deref()
        .map(format_date)
        .unwrap_or_default();
    let total = order.total.map(format_price).unwrap_or_default();
    Line::from(vec![
        Span::styled(if selected { "▸ " } else { "  " }, base.fg(Color::Cyan)),
        Span::styled(format!("#{:<8}", order.id), base),
        Span::styled(format!("{:<12}", order.status), base.fg(Color::Yellow)),
        Span::styled(format!("{date:<20}"), base.fg(Color::Gray)),
        Span::styled(format!("{total:>12}"), base.fg(Color::Green)),
    ])
}

pub fn order_items(order: &Order) -> Vec<Line<'static>> {
    order
        .items
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::raw(format!("    {} × {}", item.quantity, item.name)),
                Span::styled(
                    format!(
                        "  {} each, {}",
                        format_price(item.unit_price),
                        format_price(item.line_total)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect()
}

/// Dashboard tiles as label/value rows.
pub fn metrics(snapshot: &MetricsSnapshot) -> Vec<Line<'static>> {
    let count = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    let mut lines = vec![
        metric_row("Online users", count(snapshot.online_users)),
        metric_row("Requests / min", count(snapshot.requests_per_min)),
        metric_row("Orders today", count(snapshot.orders_today)),
        metric_row(
            "Revenue today",
            snapshot
                .revenue_today
                .map_or_else(|| "-".to_string(), format_price),
        ),
        metric_row("Total users", count(snapshot.total_users)),
    ];
    lines.extend(
        snapshot
            .extra
            .iter()
            .map(|(key, value)| metric_row(key, value.to_string())),
    );
    lines
}

fn metric_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<18}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}
