//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use shopfront_core::api::ApiClient;
use shopfront_core::storage::{
    ACCESS_TOKEN_KEY, CART_KEY, MemoryStorage, REFRESH_TOKEN_KEY, Storage, USER_KEY,
};
use wiremock::ResponseTemplate;

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Storage holding a signed-in session.
pub fn logged_in_storage(access: &str, refresh: Option<&str>) -> Arc<dyn Storage> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, access).unwrap();
    if let Some(refresh) = refresh {
        storage.set(REFRESH_TOKEN_KEY, refresh).unwrap();
    }
    storage
        .set(USER_KEY, r#"{"id":42,"email":"ada@example.com"}"#)
        .unwrap();
    storage
}

pub fn anonymous_storage() -> Arc<dyn Storage> {
    Arc::new(MemoryStorage::new())
}

/// Seeds the local cart with `(product_id, quantity)` pairs.
pub fn seed_local_cart(storage: &Arc<dyn Storage>, items: &[(u64, u32)]) {
    let items: Vec<Value> = items
        .iter()
        .map(|(id, qty)| json!({"productId": id, "quantity": qty, "addedAt": "2024-01-01T00:00:00Z"}))
        .collect();
    storage
        .set(CART_KEY, &json!({ "items": items }).to_string())
        .unwrap();
}

pub fn client(server_uri: &str, storage: &Arc<dyn Storage>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(
        format!("{server_uri}/api"),
        Arc::clone(storage),
    ))
}

pub fn auth_body(access: &str, refresh: &str) -> Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "userId": 42,
        "email": "ada@example.com",
        "tokenType": "Bearer"
    })
}

pub fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

pub fn cart_body(quantities: &[u32]) -> Value {
    let items: Vec<Value> = quantities
        .iter()
        .enumerate()
        .map(|(i, qty)| json!({"id": i + 1, "productId": i + 1, "quantity": qty, "priceAtAdd": 10.0}))
        .collect();
    json!({ "items": items, "total": 0.0 })
}
