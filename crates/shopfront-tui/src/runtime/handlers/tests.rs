use std::sync::Arc;

use serde_json::json;
use shopfront_core::Services;
use shopfront_core::api::ApiClient;
use shopfront_core::catalog::ListingQuery;
use shopfront_core::config::{CatalogSource, Config};
use shopfront_core::route::Route;
use shopfront_core::storage::{ACCESS_TOKEN_KEY, MemoryStorage, Storage, USER_KEY};
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::common::TaskId;
use crate::events::UiEvent;
use crate::state::PageData;

const TASK: TaskId = TaskId(7);

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn demo_services() -> Services {
    let mut config = Config::default();
    config.catalog.source = CatalogSource::Demo;
    config.catalog.page_size = 4;
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let api = Arc::new(ApiClient::new("http://127.0.0.1:9/api", Arc::clone(&storage)));
    Services::with_api(config, storage, api)
}

fn remote_services(server: &MockServer) -> Services {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, "token-1").unwrap();
    storage
        .set(USER_KEY, r#"{"id":42,"email":"ada@example.com"}"#)
        .unwrap();
    let api = Arc::new(ApiClient::new(
        format!("{}/api", server.uri()),
        Arc::clone(&storage),
    ));
    Services::with_api(Config::default(), storage, api)
}

async fn page(services: Services, route: Route) -> Result<PageData, String> {
    match load_page(services, TASK, route).await {
        UiEvent::PageLoaded { task, result } => {
            assert_eq!(task, TASK);
            result
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_home_page_from_demo_catalog() {
    let Ok(PageData::Home {
        categories,
        featured,
    }) = page(demo_services(), Route::Home).await
    else {
        panic!("expected home data");
    };
    assert_eq!(categories.len(), 6);
    assert!(!featured.is_empty());
}

#[tokio::test]
async fn test_products_page_is_filtered_and_paged() {
    let query = ListingQuery::parse("sort=price-asc");
    let Ok(PageData::Products { page, categories, .. }) =
        page(demo_services(), Route::Products(query)).await
    else {
        panic!("expected products data");
    };
    assert_eq!(page.content.len(), 4);
    assert!(page.total_pages > 1);
    assert!(
        page.content
            .windows(2)
            .all(|pair| pair[0].price <= pair[1].price)
    );
    assert!(!categories.is_empty());
}

#[tokio::test]
async fn test_missing_product_fails() {
    let result = page(demo_services(), Route::product("no-such-thing")).await;
    assert_eq!(result.unwrap_err(), "Product not found");

    let result = page(demo_services(), Route::Product(None)).await;
    assert_eq!(result.unwrap_err(), "Product not found");
}

#[tokio::test]
async fn test_account_requires_login() {
    let result = page(demo_services(), Route::Account).await;
    assert_eq!(result.unwrap_err(), "Please log in to view your account");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let result = page(demo_services(), Route::parse("/returns.html")).await;
    assert!(matches!(result, Ok(PageData::NotFound(p)) if p == "/returns.html"));
}

#[tokio::test]
async fn test_guest_add_updates_count_and_cart_page() {
    let services = demo_services();
    let event = add_to_cart(services.clone(), TASK, 1, 2, "Laptop".to_string()).await;
    let UiEvent::CartUpdated {
        result, success, ..
    } = event
    else {
        panic!("expected cart update");
    };
    assert_eq!(result, Ok(2));
    assert_eq!(success.as_deref(), Some("Added Laptop to cart!"));

    let Ok(PageData::Cart(view)) = page(services.clone(), Route::Cart).await else {
        panic!("expected cart data");
    };
    assert!(view.is_local);
    assert_eq!(view.total_quantity(), 2);

    let event = update_cart_item(services, TASK, 1, 0).await;
    assert!(matches!(
        event,
        UiEvent::CartUpdated { result: Ok(0), success: Some(_), .. }
    ));
}

#[tokio::test]
async fn test_guest_checkout_is_rejected() {
    let event = checkout(demo_services(), TASK).await;
    let UiEvent::OrderPlaced { result, .. } = event else {
        panic!("expected order result");
    };
    assert_eq!(result.unwrap_err(), "Please log in to checkout");
}

#[tokio::test]
async fn test_account_page_loads_profile_and_orders() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42, "email": "ada@example.com", "fullName": "Ada"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/me/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": 5, "status": "PENDING", "total": 20.0}],
            "number": 0,
            "totalPages": 1,
            "totalElements": 1,
            "size": 10
        })))
        .mount(&server)
        .await;

    let Ok(PageData::Account { profile, orders }) =
        page(remote_services(&server), Route::Account).await
    else {
        panic!("expected account data");
    };
    assert_eq!(profile.full_name.as_deref(), Some("Ada"));
    assert_eq!(orders.content[0].id, 5);
}

#[tokio::test]
async fn test_metrics_stream_forwards_snapshots() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let body = "event: heartbeat\ndata: {}\n\n\
                event: metrics\ndata: {\"onlineUsers\":3,\"ordersToday\":9}\n\n";
    Mock::given(method("GET"))
        .and(path("/api/admin/metrics/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let services = remote_services(&server);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let ended = metrics_stream(Arc::clone(&services.api), TASK, tx).await;
    assert!(matches!(ended, UiEvent::MetricsEnded { task } if task == TASK));

    let Some(UiEvent::Metrics { result: Ok(snapshot), .. }) = rx.recv().await else {
        panic!("expected a snapshot");
    };
    assert_eq!(snapshot.online_users, Some(3));
    assert_eq!(snapshot.orders_today, Some(9));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_metrics_stream_reports_rejection() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/metrics/stream"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    metrics_stream(Arc::clone(&remote_services(&server).api), TASK, tx).await;
    assert!(matches!(
        rx.recv().await,
        Some(UiEvent::Metrics { result: Err(_), .. })
    ));
}
