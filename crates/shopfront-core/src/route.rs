//! Storefront locations (`/products.html?search=mouse`) and the page they select.

use std::fmt;

use crate::catalog::ListingQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products(ListingQuery),
    /// Product detail; `None` when the location has no `slug`.
    Product(Option<String>),
    Cart,
    /// Profile and order history.
    Account,
    Admin,
    Other(String),
}

impl Route {
    /// Parses a location: a path with an optional `?query`.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        Self::from_path(path, query)
    }

    pub fn from_path(path: &str, query: &str) -> Self {
        if path.is_empty() || path == "/" || path == "/index.html" {
            return Route::Home;
        }
        // `product.html` is a substring of `products.html`; check the plural first.
        if path.contains("products.html") {
            return Route::Products(ListingQuery::parse(query));
        }
        if path.contains("product.html") {
            let slug = url::form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == "slug")
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty());
            return Route::Product(slug);
        }
        if path.contains("cart.html") {
            return Route::Cart;
        }
        if path.contains("account") {
            return Route::Account;
        }
        if path.contains("admin") {
            return Route::Admin;
        }
        Route::Other(path.to_string())
    }

    pub fn products() -> Self {
        Route::Products(ListingQuery::default())
    }

    pub fn product(slug: impl Into<String>) -> Self {
        Route::Product(Some(slug.into()))
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Products(_) => "Products",
            Route::Product(_) => "Product",
            Route::Cart => "Cart",
            Route::Account => "Account",
            Route::Admin => "Admin",
            Route::Other(_) => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Products(query) if query.is_empty() => write!(f, "/products.html"),
            Route::Products(query) => write!(f, "/products.html?{}", query.to_query_string()),
            Route::Product(Some(slug)) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(slug.as_bytes()).collect();
                write!(f, "/product.html?slug={encoded}")
            }
            Route::Product(None) => write!(f, "/product.html"),
            Route::Cart => write!(f, "/cart.html"),
            Route::Account => write!(f, "/account.html"),
            Route::Admin => write!(f, "/admin"),
            Route::Other(path) => write!(f, "{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_pages() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/index.html"), Route::Home);
        assert_eq!(Route::parse("/cart.html"), Route::Cart);
        assert_eq!(Route::parse("/admin/dashboard"), Route::Admin);
        assert_eq!(Route::parse("/account.html"), Route::Account);
        assert_eq!(
            Route::parse("/product.html?slug=smart-watch"),
            Route::product("smart-watch")
        );
        assert_eq!(Route::parse("/product.html"), Route::Product(None));
        assert_eq!(Route::parse("/about"), Route::Other("/about".to_string()));
    }

    #[test]
    fn test_parse_listing_query() {
        let Route::Products(query) = Route::parse("/products.html?search=mouse&page=1") else {
            panic!("expected products route");
        };
        assert_eq!(query.search(), "mouse");
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_display_round_trips() {
        for location in ["/", "/cart.html", "/products.html?sort=name", "/product.html?slug=mug"] {
            assert_eq!(Route::parse(location).to_string(), location);
        }
    }
}
