//! The server-backed wishlist and its snapshot.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_core::{Product, ProductId};
use shopfront_integration_tests::{TestContext, order_json, product_json};
use shopfront_storefront::accounts::Credentials;
use shopfront_storefront::{AppError, ErrorKind};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn lamp() -> Product {
    serde_json::from_value(product_json(3, "Lamp", "450.00")).unwrap()
}

#[tokio::test]
async fn sign_in_loads_the_wishlist_snapshot() {
    let ctx = TestContext::new().await;
    ctx.mount_login().await;
    ctx.mount_cart(order_json(5, &[])).await;
    ctx.mount_wishlist(json!([
        { "id": 10, "product": product_json(3, "Lamp", "450.00") },
        { "id": 11, "product": null },
    ]))
    .await;

    let mut storefront = ctx.storefront();
    assert!(!storefront.wishlist().is_in_wishlist(ProductId::new(3)));

    storefront
        .sign_in(&Credentials::new("alice", "hunter22"))
        .await
        .unwrap();

    assert!(storefront.wishlist().is_in_wishlist(ProductId::new(3)));
    assert_eq!(storefront.wishlist().snapshot().len(), 1);
}

#[tokio::test]
async fn toggle_adds_then_refetches() {
    let ctx = TestContext::new().await;
    ctx.seed_session();

    Mock::given(method("GET"))
        .and(path("/api/wishlist/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    ctx.mount_wishlist(json!([{ "id": 10, "product": product_json(3, "Lamp", "450.00") }]))
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add/"))
        .and(body_json(json!({ "product_id": 3 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    storefront.wishlist_mut().fetch().await.unwrap();
    assert!(!storefront.wishlist().is_in_wishlist(ProductId::new(3)));

    let liked = storefront.wishlist_mut().toggle(&lamp()).await.unwrap();

    assert!(liked);
    assert!(storefront.wishlist().is_in_wishlist(ProductId::new(3)));
}

#[tokio::test]
async fn remove_posts_product_id() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    ctx.mount_wishlist(json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/remove/"))
        .and(body_json(json!({ "product_id": 3 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    storefront
        .wishlist_mut()
        .remove(ProductId::new(3))
        .await
        .unwrap();
    assert!(storefront.wishlist().snapshot().is_empty());
}

#[tokio::test]
async fn failed_fetch_keeps_previous_snapshot() {
    let ctx = TestContext::new().await;
    ctx.seed_session();

    Mock::given(method("GET"))
        .and(path("/api/wishlist/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 10, "product": product_json(3, "Lamp", "450.00") }])),
        )
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wishlist/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    storefront.wishlist_mut().fetch().await.unwrap();

    let err = storefront.wishlist_mut().fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkOrServer);
    assert!(storefront.wishlist().is_in_wishlist(ProductId::new(3)));
}

#[tokio::test]
async fn anonymous_wishlist_changes_need_sign_in() {
    let ctx = TestContext::new().await;
    let mut storefront = ctx.storefront();

    let err = storefront
        .add_to_wishlist(ProductId::new(3))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SignInRequired));
    assert_eq!(err.user_message(), "Please sign in to continue.");
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn sign_out_forgets_wishlist_and_cart() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    ctx.mount_cart(order_json(5, &[(product_json(1, "Mug", "100.00"), 1)]))
        .await;
    ctx.mount_wishlist(json!([{ "id": 10, "product": product_json(3, "Lamp", "450.00") }]))
        .await;

    let mut storefront = ctx.storefront();
    storefront.refresh().await.unwrap();
    assert_eq!(storefront.cart().count(), 1);
    assert!(storefront.wishlist().is_in_wishlist(ProductId::new(3)));

    storefront.sign_out().unwrap();

    assert!(!storefront.session().is_authenticated());
    assert_eq!(storefront.cart().count(), 0);
    assert!(storefront.wishlist().snapshot().is_empty());
    assert!(ctx.store.is_empty());
}
