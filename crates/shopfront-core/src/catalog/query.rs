//! Listing page state carried in the query string.

use std::cmp::Ordering;

use crate::api::types::Product;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Input order.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
    /// Highest rating first.
    Rating,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::Name,
        SortKey::Rating,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Name => "name",
            SortKey::Rating => "rating",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "Newest",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::Name => "Name",
            SortKey::Rating => "Rating",
        }
    }

    /// The next key in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Newest => Ordering::Equal,
            SortKey::PriceAsc => a.price.total_cmp(&b.price),
            SortKey::PriceDesc => b.price.total_cmp(&a.price),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Rating => b.rating().total_cmp(&a.rating()),
        }
    }
}

/// Client-side filter over an in-memory product list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<u64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: SortKey,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().map(str::to_lowercase) {
            let in_name = product.name.to_lowercase().contains(&search);
            let in_description = product.description().to_lowercase().contains(&search);
            if !in_name && !in_description {
                return false;
            }
        }

        // Products without a category are not excluded by a category filter.
        let other_category = |wanted: u64| {
            product
                .category
                .as_ref()
                .is_some_and(|c| c.id != wanted)
        };
        if self.category.is_some_and(other_category) {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        true
    }

    /// Filters, then stable-sorts by the selected key.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        let sort = self.sort;
        matched.sort_by(|a, b| sort.compare(a, b));
        matched
    }
}

/// Listing query parameters (`search`, `category`, `minPrice`, `maxPrice`,
/// `sort`, `page`), kept in insertion order like a URL query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingQuery {
    params: Vec<(String, String)>,
}

impl ListingQuery {
    pub const SEARCH: &str = "search";
    pub const CATEGORY: &str = "category";
    pub const MIN_PRICE: &str = "minPrice";
    pub const MAX_PRICE: &str = "maxPrice";
    pub const SORT: &str = "sort";
    pub const PAGE: &str = "page";

    /// Parses a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            parsed.set(&key, &value);
        }
        parsed
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.params.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.params.push((key.to_string(), value.to_string()));
        }
    }

    fn delete(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }

    /// Sets `key` (or deletes it when `value` is blank).
    ///
    /// Changing anything but `page` resets to the first page.
    #[must_use]
    pub fn with_filter(&self, key: &str, value: &str) -> Self {
        let mut next = self.clone();
        let value = value.trim();
        if value.is_empty() {
            next.delete(key);
        } else {
            next.set(key, value);
        }
        if key != Self::PAGE {
            next.delete(Self::PAGE);
        }
        next
    }

    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        self.with_filter(Self::PAGE, &page.to_string())
    }

    /// A query with every filter removed.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn search(&self) -> &str {
        self.get(Self::SEARCH).unwrap_or_default()
    }

    /// Zero-based page; anything unparseable is page 0.
    pub fn page(&self) -> u32 {
        self.get(Self::PAGE)
            .and_then(|p| p.parse().ok())
            .unwrap_or(0)
    }

    pub fn sort(&self) -> SortKey {
        self.get(Self::SORT)
            .and_then(SortKey::parse)
            .unwrap_or_default()
    }

    /// The client-side filter described by this query.
    ///
    /// Unparseable price bounds or category ids are ignored.
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.non_empty(Self::SEARCH).map(str::to_string),
            category: self.non_empty(Self::CATEGORY).and_then(|v| v.parse().ok()),
            min_price: self.non_empty(Self::MIN_PRICE).and_then(|v| v.parse().ok()),
            max_price: self.non_empty(Self::MAX_PRICE).and_then(|v| v.parse().ok()),
            sort: self.sort(),
        }
    }

    /// Parameters forwarded to `GET /products`.
    pub fn api_params(&self, page_size: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        for key in [
            Self::SEARCH,
            Self::CATEGORY,
            Self::MIN_PRICE,
            Self::MAX_PRICE,
        ] {
            if let Some(value) = self.get(key).filter(|v| !v.is_empty()) {
                params.push((key, value.to_string()));
            }
        }
        params.push((Self::SORT, self.sort().as_str().to_string()));
        params.push((Self::PAGE, self.page().to_string()));
        params.push(("size", page_size.to_string()));
        params
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}
