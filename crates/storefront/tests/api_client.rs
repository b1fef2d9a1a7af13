//! HTTP-level tests for `ApiClient`: bearer handling, the one-shot token
//! refresh, and status mapping.
//!
//! Every test runs against its own `wiremock` server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use shopfront_core::{CartAction, ProductId, SessionCredential};
use shopfront_storefront::api::{ApiClient, ApiError};
use shopfront_storefront::config::ApiConfig;
use shopfront_storefront::session::Session;
use shopfront_storefront::storage::{LocalStore, MemoryStore, keys};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, session: Session) -> ApiClient {
    let config = ApiConfig::new(&format!("{}/api", server.uri())).unwrap();
    ApiClient::new(&config, session).unwrap()
}

fn signed_in(store: &Arc<MemoryStore>) -> Session {
    let session = Session::anonymous(store.clone());
    session
        .establish(SessionCredential::new("old-access", "refresh-1"))
        .unwrap();
    session
}

fn empty_cart() -> serde_json::Value {
    json!({ "id": 7, "completed": false, "orderitems": [] })
}

// ---------------------------------------------------------------------------
// Token refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_access_token_is_refreshed_and_request_retried_once() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new-access" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_cart()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, signed_in(&store));
    let cart = client.cart().await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(
        client.session().access_token().as_deref(),
        Some("new-access")
    );
    assert_eq!(
        store.get(keys::ACCESS_TOKEN).unwrap().as_deref(),
        Some("new-access")
    );
    // Not rotated, so the old refresh token is kept.
    assert_eq!(
        store.get(keys::REFRESH_TOKEN).unwrap().as_deref(),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    Mock::given(method("GET"))
        .and(path("/api/wishlist/"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "new-access", "refresh": "refresh-2" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wishlist/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server, signed_in(&store));
    client.wishlist().await.unwrap();

    assert_eq!(client.session().refresh_token().as_deref(), Some("refresh-2"));
    assert_eq!(
        store.get(keys::REFRESH_TOKEN).unwrap().as_deref(),
        Some("refresh-2")
    );
}

#[tokio::test]
async fn failed_refresh_clears_session_and_reports_expiry() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is invalid or expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, signed_in(&store));
    let result = client.cart().await;

    assert!(matches!(result, Err(ApiError::AuthExpired)), "got {result:?}");
    assert!(!client.session().is_authenticated());
    assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert!(store.get(keys::REFRESH_TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn second_rejection_after_refresh_clears_session() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    // Rejects both the original and the retried request.
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new-access" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, signed_in(&store));
    let result = client.update_cart(ProductId::new(1), CartAction::Add).await;

    assert!(matches!(result, Err(ApiError::AuthExpired)), "got {result:?}");
    assert!(!client.session().is_authenticated());
    assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn rejection_without_refresh_token_is_unauthorized_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::anonymous(Arc::new(MemoryStore::new()));
    let client = client_for(&server, session);
    let result = client.orders().await;

    assert!(matches!(result, Err(ApiError::Unauthorized)), "got {result:?}");
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_requests_never_carry_a_bearer_token() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .and(query_param("search", "mug"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Mug", "price": "100.00", "digital": false, "image": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, signed_in(&store));
    let products = client.products(Some("  mug ")).await.unwrap();
    assert_eq!(products.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = requests.first().unwrap();
    assert!(request.headers.get("authorization").is_none());
    assert!(request.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn each_request_gets_a_fresh_request_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::anonymous(Arc::new(MemoryStore::new())));
    client.products(None).await.unwrap();
    client.products(None).await.unwrap();

    let ids: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.headers.get("x-request-id").unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids.first(), ids.get(1));
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_carries_field_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "password": ["This field may not be blank."] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Session::anonymous(Arc::new(MemoryStore::new())));
    let password = secrecy::SecretString::from("");
    let result = client.obtain_token("alice", &password).await;

    match result {
        Err(ApiError::BadRequest(errors)) => {
            assert_eq!(errors.to_string(), "This field may not be blank.");
            assert_eq!(errors.for_field("password").count(), 1);
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::anonymous(Arc::new(MemoryStore::new())));
    let result = client.product(ProductId::new(99)).await;

    assert!(result.as_ref().is_err_and(ApiError::is_not_found), "got {result:?}");
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/homepage-banner/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::anonymous(Arc::new(MemoryStore::new())));
    match client.banner().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("upstream unavailable"));
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}
