//! Built-in sample catalog used when `catalog.source = "demo"`.

use crate::api::types::{Category, CategoryRef, Inventory, Product};

const PLACEHOLDER_IMAGE: &str = "/uploads/placeholder.svg";

struct DemoProduct {
    id: u64,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: f64,
    rating: f64,
    reviews: u32,
    stock: i64,
    category: u64,
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        id: 1,
        name: "Wireless Headphones",
        slug: "wireless-headphones",
        description: "High-quality wireless headphones with noise cancellation",
        price: 99.99,
        rating: 4.5,
        reviews: 128,
        stock: 50,
        category: 1,
    },
    DemoProduct {
        id: 2,
        name: "Smart Watch",
        slug: "smart-watch",
        description: "Feature-rich smartwatch with health monitoring",
        price: 199.99,
        rating: 4.2,
        reviews: 89,
        stock: 30,
        category: 1,
    },
    DemoProduct {
        id: 3,
        name: "Laptop Stand",
        slug: "laptop-stand",
        description: "Ergonomic laptop stand for better posture",
        price: 49.99,
        rating: 4.7,
        reviews: 156,
        stock: 75,
        category: 1,
    },
    DemoProduct {
        id: 4,
        name: "Coffee Maker",
        slug: "coffee-maker",
        description: "Programmable coffee maker with thermal carafe",
        price: 79.99,
        rating: 4.3,
        reviews: 67,
        stock: 25,
        category: 3,
    },
    DemoProduct {
        id: 5,
        name: "Bluetooth Speaker",
        slug: "bluetooth-speaker",
        description: "Portable wireless speaker with excellent sound quality",
        price: 59.99,
        rating: 4.4,
        reviews: 92,
        stock: 40,
        category: 1,
    },
    DemoProduct {
        id: 6,
        name: "Wireless Mouse",
        slug: "wireless-mouse",
        description: "Ergonomic wireless mouse with long battery life",
        price: 29.99,
        rating: 4.1,
        reviews: 203,
        stock: 100,
        category: 1,
    },
];

const CATEGORIES: &[(u64, &str, &str, u32)] = &[
    (1, "Electronics", "electronics", 150),
    (2, "Clothing", "clothing", 200),
    (3, "Home & Garden", "home-garden", 80),
    (4, "Sports", "sports", 120),
    (5, "Books", "books", 300),
    (6, "Beauty", "beauty", 90),
];

fn category_name(id: u64) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(cid, ..)| *cid == id)
        .map_or("", |(_, name, ..)| name)
}

pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(|p| Product {
            id: p.id,
            slug: p.slug.to_string(),
            name: p.name.to_string(),
            description: Some(p.description.to_string()),
            price: p.price,
            main_image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            average_rating: Some(p.rating),
            review_count: Some(p.reviews),
            inventory: Some(Inventory { stock: p.stock }),
            category: Some(CategoryRef {
                id: p.category,
                name: category_name(p.category).to_string(),
            }),
        })
        .collect()
}

pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(id, name, slug, count)| Category {
            id: *id,
            name: (*name).to_string(),
            slug: Some((*slug).to_string()),
            product_count: Some(*count),
        })
        .collect()
}

pub fn find_by_slug(slug: &str) -> Option<Product> {
    products().into_iter().find(|p| p.slug == slug)
}

pub fn find_by_id(id: u64) -> Option<Product> {
    products().into_iter().find(|p| p.id == id)
}
