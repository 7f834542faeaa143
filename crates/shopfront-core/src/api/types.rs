//! Wire types for the storefront REST API.
//!
//! The backend speaks camelCase JSON. Response types are lenient: optional
//! fields default when missing so partially populated payloads (mock
//! controllers, older servers) still deserialize.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Body returned by `/auth/login`, `/auth/register` and `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub email: String,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Read-only product snapshot used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Product {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Average rating, 0 when the product has none.
    pub fn rating(&self) -> f64 {
        self.average_rating.unwrap_or(0.0)
    }

    pub fn reviews(&self) -> u32 {
        self.review_count.unwrap_or(0)
    }

    /// A product without inventory data is treated as out of stock.
    pub fn in_stock(&self) -> bool {
        self.inventory.is_some_and(|inv| inv.stock > 0)
    }

    pub fn stock(&self) -> i64 {
        self.inventory.map_or(0, |inv| inv.stock)
    }
}

/// Spring-style page envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// A single page holding every element.
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            number: 0,
            total_pages: u32::from(len > 0),
            total_elements: len as u64,
            size: len as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerProfile {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    #[serde(default)]
    pub profile: Option<ReviewerProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub id: Option<u64>,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<Reviewer>,
}

impl Review {
    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.profile.as_ref())
            .and_then(|p| p.full_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// Body of `GET /products/{slug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    #[serde(default)]
    pub related_products: Vec<Product>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    /// Server-side cart line id (used for PATCH/DELETE).
    pub id: u64,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub price_at_add: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl RemoteCart {
    /// Saturates at `u32::MAX`.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.quantity)
            .fold(0, u32::saturating_add)
    }
}

// ============================================================================
// Account & orders
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub status: String,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: u64,
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Admin
// ============================================================================

/// One `metrics` event from `/admin/metrics/stream`; also the body of the
/// dashboard summary (which adds `totalUsers`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub online_users: Option<u64>,
    #[serde(default)]
    pub requests_per_min: Option<u64>,
    #[serde(default)]
    pub orders_today: Option<u64>,
    #[serde(default)]
    pub revenue_today: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_tolerates_sparse_payload() {
        let product: Product =
            serde_json::from_str(r#"{"id":7,"slug":"mug","name":"Mug","price":4.5,"description":null}"#)
                .unwrap();
        assert_eq!(product.description(), "");
        assert!((product.rating() - 0.0).abs() < f64::EPSILON);
        assert!(!product.in_stock());
    }

    #[test]
    fn test_auth_response_camel_case() {
        let auth: AuthResponse = serde_json::from_str(
            r#"{"accessToken":"a","refreshToken":"r","userId":3,"email":"x@y.z","tokenType":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(auth.user_id, 3);
        assert_eq!(auth.refresh_token, "r");
    }

    #[test]
    fn test_review_author_falls_back_to_anonymous() {
        let review: Review = serde_json::from_str(r#"{"rating":4,"body":"Nice"}"#).unwrap();
        assert_eq!(review.author(), "Anonymous");

        let named: Review = serde_json::from_str(
            r#"{"rating":5,"body":"Great","user":{"profile":{"fullName":"Grace Hopper"}}}"#,
        )
        .unwrap();
        assert_eq!(named.author(), "Grace Hopper");
    }

    #[test]
    fn test_remote_cart_total_quantity() {
        let cart: RemoteCart =
            serde_json::from_str(r#"{"items":[{"id":1,"quantity":2},{"id":2,"quantity":3}],"total":0.0}"#)
                .unwrap();
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_remote_cart_total_quantity_saturates() {
        let cart: RemoteCart = serde_json::from_str(
            r#"{"items":[{"id":1,"quantity":3000000000},{"id":2,"quantity":3000000000}]}"#,
        )
        .unwrap();
        assert_eq!(cart.total_quantity(), u32::MAX);
    }

    #[test]
    fn test_add_item_request_is_camel_case() {
        let json = serde_json::to_value(AddCartItemRequest {
            product_id: 9,
            quantity: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"productId": 9, "quantity": 2}));
    }
}
