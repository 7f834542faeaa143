//! Product catalog: listing, featured products, categories and detail pages.
//!
//! The remote source delegates search, filtering and paging to the API. The
//! demo source filters and sorts the built-in sample list client-side.

pub mod demo;
mod query;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Result, bail};

pub use query::{ListingQuery, ProductFilter, SortKey};

use crate::api::ApiClient;
use crate::api::types::{Category, Page, Product, ProductDetail};
use crate::config::{CatalogConfig, CatalogSource};

/// Categories shown on the home page.
pub const HOME_CATEGORY_COUNT: usize = 6;

/// Related products shown on a demo detail page.
const DEMO_RELATED_COUNT: usize = 3;

pub struct Catalog {
    api: Arc<ApiClient>,
    source: CatalogSource,
    page_size: u32,
    featured_limit: u32,
    /// Products seen in any response, used to label local cart lines.
    seen: Mutex<HashMap<u64, Product>>,
}

impl Catalog {
    pub fn new(api: Arc<ApiClient>, config: &CatalogConfig) -> Self {
        Self {
            api,
            source: config.source,
            page_size: config.page_size.max(1),
            featured_limit: config.featured_limit,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    /// One page of the product listing described by `query`.
    ///
    /// # Errors
    /// Returns an error if the remote request fails.
    pub async fn list_products(&self, query: &ListingQuery) -> Result<Page<Product>> {
        let page = match self.source {
            CatalogSource::Remote => {
                self.api
                    .get_products(&query.api_params(self.page_size))
                    .await?
            }
            CatalogSource::Demo => {
                paginate(query.filter().apply(&demo::products()), query.page(), self.page_size)
            }
        };
        self.remember(&page.content);
        Ok(page)
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    /// Returns an error if the remote request fails.
    pub async fn featured(&self) -> Result<Vec<Product>> {
        let products = match self.source {
            CatalogSource::Remote => self.api.get_featured_products(self.featured_limit).await?,
            CatalogSource::Demo => demo::products()
                .into_iter()
                .take(self.featured_limit as usize)
                .collect(),
        };
        self.remember(&products);
        Ok(products)
    }

    /// # Errors
    /// Returns an error if the remote request fails.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        match self.source {
            CatalogSource::Remote => Ok(self.api.get_categories().await?),
            CatalogSource::Demo => Ok(demo::categories()),
        }
    }

    /// The first categories, as shown on the home page.
    ///
    /// # Errors
    /// Returns an error if the remote request fails.
    pub async fn top_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories().await?;
        categories.truncate(HOME_CATEGORY_COUNT);
        Ok(categories)
    }

    /// Product detail with related products and reviews.
    ///
    /// # Errors
    /// Returns an error if the slug is unknown or the remote request fails.
    pub async fn product_detail(&self, slug: &str) -> Result<ProductDetail> {
        let slug = slug.trim();
        if slug.is_empty() {
            bail!("Product not found");
        }

        let detail = match self.source {
            CatalogSource::Remote => self.api.get_product(slug).await?,
            CatalogSource::Demo => {
                let Some(product) = demo::find_by_slug(slug) else {
                    bail!("Product not found");
                };
                let related_products = demo::products()
                    .into_iter()
                    .filter(|p| p.slug != slug)
                    .take(DEMO_RELATED_COUNT)
                    .collect();
                ProductDetail {
                    product,
                    related_products,
                    reviews: Vec::new(),
                }
            }
        };

        self.remember(std::slice::from_ref(&detail.product));
        self.remember(&detail.related_products);
        Ok(detail)
    }

    /// A product snapshot by id: responses seen so far, then (demo source
    /// only) the sample catalog.
    pub fn lookup(&self, product_id: u64) -> Option<Product> {
        let seen = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .cloned();
        match self.source {
            CatalogSource::Demo => seen.or_else(|| demo::find_by_id(product_id)),
            CatalogSource::Remote => seen,
        }
    }

    fn remember(&self, products: &[Product]) {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        for product in products {
            seen.insert(product.id, product.clone());
        }
    }
}

/// Slices an already filtered list into a zero-based page.
pub fn paginate(products: Vec<Product>, page: u32, page_size: u32) -> Page<Product> {
    let size = page_size.max(1);
    let total = products.len();
    let total_pages = total.div_ceil(size as usize) as u32;
    let content = products
        .into_iter()
        .skip(page as usize * size as usize)
        .take(size as usize)
        .collect();

    Page {
        content,
        number: page,
        total_pages,
        total_elements: total as u64,
        size,
    }
}
