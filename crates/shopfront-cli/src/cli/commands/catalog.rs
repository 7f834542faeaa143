//! Catalog command handlers: products, product detail, categories, featured.

use anyhow::{Context, Result};
use shopfront_core::Services;
use shopfront_core::api::types::Product;
use shopfront_core::catalog::ListingQuery;
use shopfront_core::format::{format_date, format_price, stars, truncate};

use crate::cli::ListingArgs;

const DESCRIPTION_CHARS: usize = 60;

pub async fn products(services: &Services, args: &ListingArgs) -> Result<()> {
    let query = listing_query(args);
    let page = services
        .catalog
        .list_products(&query)
        .await
        .context("load products")?;

    if page.content.is_empty() {
        println!("No products found.");
        if !query.is_empty() {
            println!("Try different filters.");
        }
        return Ok(());
    }

    println!(
        "Showing {} of {} products (page {} of {}, sorted by {})",
        page.content.len(),
        page.total_elements,
        page.number.saturating_add(1),
        page.total_pages.max(1),
        query.sort().label()
    );
    for product in &page.content {
        println!("{}", product_row(product));
    }
    Ok(())
}

pub async fn product(services: &Services, slug: &str) -> Result<()> {
    let detail = services
        .catalog
        .product_detail(slug)
        .await
        .with_context(|| format!("load product '{slug}'"))?;
    let product = &detail.product;

    println!("{}  (#{})", product.name, product.id);
    if let Some(category) = &product.category {
        println!("Category: {}", category.name);
    }
    println!(
        "{} ({} reviews)",
        stars(product.rating()),
        product.reviews()
    );
    println!("Price: {}", format_price(product.price));
    println!("{}", stock_label(product));
    if !product.description().is_empty() {
        println!();
        println!("{}", product.description());
    }

    if !detail.related_products.is_empty() {
        println!();
        println!("Related products:");
        for related in &detail.related_products {
            println!("{}", product_row(related));
        }
    }

    if !detail.reviews.is_empty() {
        println!();
        println!("Reviews:");
        for review in &detail.reviews {
            let date = review.created_at.as_deref().map(format_date);
            println!(
                "  {} {}{}",
                stars(f64::from(review.rating)),
                review.author(),
                date.map(|d| format!(" - {d}")).unwrap_or_default()
            );
            if let Some(title) = review.title.as_deref().filter(|t| !t.is_empty()) {
                println!("    {title}");
            }
            if !review.body.is_empty() {
                println!("    {}", review.body);
            }
        }
    }
    Ok(())
}

pub async fn categories(services: &Services) -> Result<()> {
    let categories = services
        .catalog
        .categories()
        .await
        .context("load categories")?;
    if categories.is_empty() {
        println!("No categories found.");
    }
    for category in categories {
        let count = category
            .product_count
            .map(|n| format!(" ({n} products)"))
            .unwrap_or_default();
        println!("{:>4}  {}{count}", category.id, category.name);
    }
    Ok(())
}

pub async fn featured(services: &Services) -> Result<()> {
    let products = services
        .catalog
        .featured()
        .await
        .context("load featured products")?;
    if products.is_empty() {
        println!("No featured products.");
    }
    for product in &products {
        println!("{}", product_row(product));
    }
    Ok(())
}

/// Maps the listing flags onto the same query the products page uses.
fn listing_query(args: &ListingArgs) -> ListingQuery {
    let mut query = ListingQuery::default();
    if let Some(search) = &args.search {
        query = query.with_filter(ListingQuery::SEARCH, search);
    }
    if let Some(category) = args.category {
        query = query.with_filter(ListingQuery::CATEGORY, &category.to_string());
    }
    if let Some(min) = args.min_price {
        query = query.with_filter(ListingQuery::MIN_PRICE, &min.to_string());
    }
    if let Some(max) = args.max_price {
        query = query.with_filter(ListingQuery::MAX_PRICE, &max.to_string());
    }
    if let Some(sort) = args.sort {
        query = query.with_filter(ListingQuery::SORT, sort.as_str());
    }
    if args.page > 1 {
        query = query.with_page(args.page - 1);
    }
    query
}

fn stock_label(product: &Product) -> String {
    if product.in_stock() {
        format!("In stock ({})", product.stock())
    } else {
        "Out of stock".to_string()
    }
}

fn product_row(product: &Product) -> String {
    format!(
        "{:>4}  {:<28} {:>10}  {} ({})  {}",
        product.id,
        truncate(&product.name, 25),
        format_price(product.price),
        stars(product.rating()),
        product.reviews(),
        if product.in_stock() {
            truncate(product.description(), DESCRIPTION_CHARS)
        } else {
            "Out of stock".to_string()
        }
    )
}

#[cfg(test)]
mod tests {
    use shopfront_core::catalog::{SortKey, demo};

    use super::*;

    #[test]
    fn test_listing_query_from_flags() {
        let args = ListingArgs {
            search: Some("mouse".to_string()),
            category: Some(1),
            min_price: Some(10.0),
            max_price: None,
            sort: Some(SortKey::PriceAsc),
            page: 3,
        };
        let query = listing_query(&args);

        assert_eq!(query.search(), "mouse");
        assert_eq!(query.get(ListingQuery::CATEGORY), Some("1"));
        assert_eq!(query.get(ListingQuery::MIN_PRICE), Some("10"));
        assert_eq!(query.get(ListingQuery::MAX_PRICE), None);
        assert_eq!(query.sort(), SortKey::PriceAsc);
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_listing_query_defaults_to_first_page() {
        let args = ListingArgs {
            page: 1,
            ..ListingArgs::default()
        };
        let query = listing_query(&args);
        assert!(query.is_empty());
        assert_eq!(query.page(), 0);
    }

    #[test]
    fn test_product_row_marks_out_of_stock() {
        let mut product = demo::find_by_id(1).unwrap();
        assert!(product_row(&product).contains("$99.99"));
        product.inventory = None;
        assert!(product_row(&product).ends_with("Out of stock"));
        assert_eq!(stock_label(&product), "Out of stock");
    }
}
