//! Integration tests for cart reconciliation and the cart count.

mod fixtures;

use std::sync::Arc;

use fixtures::{
    anonymous_storage, auth_body, can_bind_localhost, cart_body, client, json_response,
    logged_in_storage, seed_local_cart,
};
use serde_json::{Value, json};
use shopfront_core::Services;
use shopfront_core::cart::CartManager;
use shopfront_core::config::Config;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bodies of every `POST /cart/items` the server saw, in arrival order.
async fn added_items(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/api/cart/items")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_sync_replays_items_in_order_then_clears() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(json_response(201, json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;
    // The caller decides whether to recount.
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(json_response(200, cart_body(&[2, 1])))
        .expect(0)
        .mount(&server)
        .await;

    let storage = logged_in_storage("access", Some("refresh"));
    seed_local_cart(&storage, &[(1, 2), (2, 1)]);
    let cart = CartManager::new(client(&server.uri(), &storage), Arc::clone(&storage));

    let report = cart.sync_cart_on_login().await.unwrap();
    assert_eq!(report.synced, 2);

    assert_eq!(
        added_items(&server).await,
        vec![
            json!({"productId": 1, "quantity": 2}),
            json!({"productId": 2, "quantity": 1}),
        ]
    );
    assert!(cart.local_cart().is_empty());
    assert_eq!(
        storage.get("cart").as_deref(),
        Some(r#"{"items":[]}"#)
    );
}

#[tokio::test]
async fn test_sync_failure_keeps_local_cart() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .and(body_json(json!({"productId": 1, "quantity": 2})))
        .respond_with(json_response(201, json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .and(body_json(json!({"productId": 2, "quantity": 1})))
        .respond_with(json_response(409, json!({"message": "Out of stock"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .and(body_json(json!({"productId": 3, "quantity": 4})))
        .respond_with(json_response(201, json!({"id": 3})))
        .expect(0)
        .mount(&server)
        .await;

    let storage = logged_in_storage("access", Some("refresh"));
    seed_local_cart(&storage, &[(1, 2), (2, 1), (3, 4)]);
    let cart = CartManager::new(client(&server.uri(), &storage), Arc::clone(&storage));

    let err = cart.sync_cart_on_login().await.unwrap_err();
    assert!(format!("{err:#}").contains("Out of stock"));

    let local = cart.local_cart();
    assert_eq!(local.items.len(), 3);
    assert_eq!(local.total_quantity(), 7);
}

#[tokio::test]
async fn test_cart_count_falls_back_to_local_sum() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let storage = logged_in_storage("access", Some("refresh"));
    seed_local_cart(&storage, &[(1, 2), (5, 3)]);
    let cart = CartManager::new(client(&server.uri(), &storage), Arc::clone(&storage));

    assert_eq!(cart.update_cart_count().await, 5);
}

#[tokio::test]
async fn test_authenticated_count_uses_server_cart() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(json_response(200, cart_body(&[4, 4])))
        .mount(&server)
        .await;

    let storage = logged_in_storage("access", Some("refresh"));
    seed_local_cart(&storage, &[(1, 1)]);
    let cart = CartManager::new(client(&server.uri(), &storage), Arc::clone(&storage));

    assert_eq!(cart.update_cart_count().await, 8);
}

#[tokio::test]
async fn test_remote_mutations_use_line_ids() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/cart/items/11"))
        .and(body_json(json!({"quantity": 3})))
        .respond_with(json_response(200, json!({"id": 11, "quantity": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart/items/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(json_response(200, cart_body(&[3])))
        .mount(&server)
        .await;

    let storage = logged_in_storage("access", Some("refresh"));
    let cart = CartManager::new(client(&server.uri(), &storage), Arc::clone(&storage));

    assert_eq!(cart.update_quantity(11, 3).await.unwrap(), 3);
    assert_eq!(cart.update_quantity(12, 0).await.unwrap(), 3);
}

#[tokio::test]
async fn test_login_syncs_anonymous_cart() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(json_response(200, auth_body("access-1", "refresh-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(json_response(201, json!({"id": 1})))
        .expect(2)
        .mount(&server)
        .await;
    // One count before the sync, one after.
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(json_response(200, cart_body(&[2, 1])))
        .expect(2)
        .mount(&server)
        .await;

    let storage = anonymous_storage();
    let services = Services::with_api(
        Config::default(),
        Arc::clone(&storage),
        client(&server.uri(), &storage),
    );

    services.cart.add_to_cart(1, 2).await.unwrap();
    services.cart.add_to_cart(2, 1).await.unwrap();

    let outcome = services
        .auth
        .login("ada@example.com", "secret")
        .await
        .unwrap();
    assert_eq!(outcome.user.email, "ada@example.com");
    assert_eq!(outcome.sync.synced, 2);
    assert!(outcome.sync_error.is_none());
    assert_eq!(outcome.cart_count, 3);
    assert!(services.cart.local_cart().is_empty());

    let count = services.auth.logout().await.unwrap();
    assert_eq!(count, 0);
    assert!(!services.api.is_authenticated());
}

#[tokio::test]
async fn test_login_survives_sync_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(json_response(200, auth_body("access-1", "refresh-1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/items"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(json_response(200, cart_body(&[])))
        .mount(&server)
        .await;

    let storage = anonymous_storage();
    seed_local_cart(&storage, &[(4, 1)]);
    let services = Services::with_api(
        Config::default(),
        Arc::clone(&storage),
        client(&server.uri(), &storage),
    );

    let outcome = services
        .auth
        .login("ada@example.com", "secret")
        .await
        .unwrap();
    assert!(outcome.sync_error.is_some());
    assert_eq!(outcome.sync.synced, 0);
    assert_eq!(services.cart.local_cart().total_quantity(), 1);
    assert!(services.api.is_authenticated());
}
