//! Sign-in merges the anonymous cart mirror into the account cart.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_core::ProductId;
use shopfront_integration_tests::{TestContext, order_json, product_json};
use shopfront_storefront::accounts::Credentials;
use shopfront_storefront::cart::CartMode;
use shopfront_storefront::storage::{LocalStore, keys};
use shopfront_storefront::{AppError, ErrorKind};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_product(ctx: &TestContext, id: i64, name: &str, price: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/products/{id}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(id, name, price)))
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn anonymous_units_are_replayed_one_add_each_then_mirror_is_deleted() {
    let ctx = TestContext::new().await;
    mount_product(&ctx, 1, "Mug", "100.00").await;
    ctx.mount_login().await;
    ctx.mount_wishlist(json!([])).await;
    ctx.expect_cart_updates(1, "add", 2).await;
    ctx.mount_cart(order_json(5, &[(product_json(1, "Mug", "100.00"), 2)]))
        .await;

    let mut storefront = ctx.storefront();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    assert_eq!(storefront.cart().mode(), CartMode::Anonymous);
    assert_eq!(storefront.cart().count(), 2);
    assert!(ctx.store.get(keys::CART).unwrap().is_some());

    let report = storefront
        .sign_in(&Credentials::new("alice", "hunter22"))
        .await
        .unwrap();

    assert_eq!(report.lines, 1);
    assert_eq!(report.units_merged, 2);
    assert!(report.is_complete());
    assert!(report.mirror_discarded);

    assert_eq!(storefront.cart().mode(), CartMode::Authenticated);
    assert_eq!(storefront.cart().count(), 2);
    assert_eq!(storefront.cart().total().display(), "₹200.00");
    assert!(ctx.store.get(keys::CART).unwrap().is_none());
    assert!(ctx.store.get(keys::ACCESS_TOKEN).unwrap().is_some());
}

#[tokio::test]
async fn rejected_units_are_counted_and_mirror_is_still_deleted() {
    let ctx = TestContext::new().await;
    mount_product(&ctx, 1, "Mug", "100.00").await;
    mount_product(&ctx, 2, "Lamp", "450.00").await;
    ctx.mount_login().await;
    ctx.mount_wishlist(json!([])).await;
    ctx.expect_cart_updates(1, "add", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .and(body_json(json!({ "productId": 2, "action": "add" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    ctx.mount_cart(order_json(5, &[(product_json(1, "Mug", "100.00"), 1)]))
        .await;

    let mut storefront = ctx.storefront();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    storefront.add_to_cart(ProductId::new(2)).await.unwrap();
    assert_eq!(storefront.cart().total().display(), "₹550.00");

    let report = storefront
        .sign_in(&Credentials::new("alice", "hunter22"))
        .await
        .unwrap();

    assert_eq!(report.units_merged, 1);
    assert_eq!(report.units_failed, 1);
    assert!(!report.is_complete());
    assert!(report.mirror_discarded);
    assert!(ctx.store.get(keys::CART).unwrap().is_none());

    // The displayed cart is what the server holds.
    assert_eq!(storefront.cart().count(), 1);
    assert_eq!(storefront.cart().total().display(), "₹100.00");
}

#[tokio::test]
async fn session_lost_mid_merge_skips_the_remaining_units() {
    let ctx = TestContext::new().await;
    mount_product(&ctx, 1, "Mug", "100.00").await;
    ctx.mount_login().await;
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    for _ in 0..3 {
        storefront.add_to_cart(ProductId::new(1)).await.unwrap();
    }
    assert_eq!(storefront.cart().count(), 3);

    let report = storefront
        .sign_in(&Credentials::new("alice", "hunter22"))
        .await
        .unwrap();

    assert_eq!(report.lines, 1);
    assert_eq!(report.units_merged, 0);
    assert_eq!(report.units_failed, 1);
    assert_eq!(report.units_skipped, 2);
    assert!(!report.is_complete());
    assert!(report.mirror_discarded);

    assert_eq!(ctx.request_count("POST", "/api/cart/update/").await, 1);
    assert_eq!(ctx.request_count("GET", "/api/cart/").await, 0);
    assert!(!storefront.session().is_authenticated());
    assert_eq!(storefront.cart().mode(), CartMode::Anonymous);
    assert!(storefront.cart().cart().is_empty());
    assert!(ctx.store.get(keys::CART).unwrap().is_none());
    assert!(ctx.store.get(keys::ACCESS_TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn empty_mirror_merges_nothing() {
    let ctx = TestContext::new().await;
    ctx.mount_login().await;
    ctx.mount_wishlist(json!([])).await;
    ctx.expect_cart_updates(1, "add", 0).await;
    ctx.mount_cart(order_json(5, &[(product_json(1, "Mug", "100.00"), 3)]))
        .await;

    let mut storefront = ctx.storefront();
    let report = storefront
        .sign_in(&Credentials::new("alice", "hunter22"))
        .await
        .unwrap();

    assert_eq!(report.lines, 0);
    assert_eq!(report.units_merged, 0);
    // The server cart from an earlier visit shows up unchanged.
    assert_eq!(storefront.cart().count(), 3);
}

#[tokio::test]
async fn invalid_credentials_leave_mirror_and_session_alone() {
    let ctx = TestContext::new().await;
    mount_product(&ctx, 1, "Mug", "100.00").await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({ "detail": "No active account found with the given credentials" }),
        ))
        .mount(&ctx.server)
        .await;
    ctx.expect_cart_updates(1, "add", 0).await;

    let mut storefront = ctx.storefront();
    storefront.add_to_cart(ProductId::new(1)).await.unwrap();

    let err = storefront
        .sign_in(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials), "got {err:?}");
    assert_eq!(err.user_message(), "Invalid username or password.");
    assert!(!storefront.session().is_authenticated());
    assert_eq!(storefront.cart().mode(), CartMode::Anonymous);
    assert!(ctx.store.get(keys::CART).unwrap().is_some());
}

#[tokio::test]
async fn blank_credentials_are_rejected_before_any_request() {
    let ctx = TestContext::new().await;
    let mut storefront = ctx.storefront();

    let err = storefront
        .sign_in(&Credentials::new("  ", ""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(ctx.request_count("POST", "/api/token/").await, 0);
}
