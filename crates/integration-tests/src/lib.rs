//! End-to-end storefront scenarios.
//!
//! Each test stands up a `wiremock` server playing the shop's REST API
//! under `/api/` and drives a [`Storefront`] against it. Nothing touches
//! the network or the real state directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use shopfront_storefront::api::{PaymentConfirmation, PaymentSession};
use shopfront_storefront::checkout::{PaymentGateway, PaymentOutcome, ShippingAddress};
use shopfront_storefront::config::{ApiConfig, StorefrontConfig};
use shopfront_storefront::storage::{LocalStore, MemoryStore, keys};
use shopfront_storefront::{Result, Storefront};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "access-token";
pub const REFRESH_TOKEN: &str = "refresh-token";

/// A mock API plus the local store the storefront under test uses.
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn config(&self) -> StorefrontConfig {
        let api = ApiConfig::new(&format!("{}/api", self.server.uri()))
            .expect("mock server URI is a valid base URL");
        StorefrontConfig::new(api, "unused-state-dir")
    }

    /// A storefront over this context's store, restoring whatever session
    /// the store holds.
    pub fn storefront(&self) -> Storefront {
        Storefront::with_store(self.config(), self.store.clone())
            .expect("failed to build storefront")
    }

    /// Put a credential pair in the store as if a previous run signed in.
    pub fn seed_session(&self) {
        self.store
            .set(keys::ACCESS_TOKEN, ACCESS_TOKEN)
            .expect("memory store write");
        self.store
            .set(keys::REFRESH_TOKEN, REFRESH_TOKEN)
            .expect("memory store write");
    }

    /// `POST token/` accepts any credentials.
    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access": ACCESS_TOKEN, "refresh": REFRESH_TOKEN })),
            )
            .mount(&self.server)
            .await;
    }

    /// `GET cart/` returns `body`.
    pub async fn mount_cart(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/cart/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// `GET wishlist/` returns `body`.
    pub async fn mount_wishlist(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/api/wishlist/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly `times` single-unit `cart/update/` calls for one
    /// product and action.
    pub async fn expect_cart_updates(&self, product_id: i64, action: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/cart/update/"))
            .and(body_json(json!({ "productId": product_id, "action": action })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("Item was added")))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the mock received for `method path`.
    pub async fn request_count(&self, http_method: &str, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .count()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product as the server serializes it.
pub fn product_json(id: i64, name: &str, price: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "digital": false,
        "image": format!("/images/{id}.jpg"),
    })
}

/// An open order with one item per `(product, quantity)`.
pub fn order_json(id: i64, items: &[(Value, i64)]) -> Value {
    let orderitems: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (product, quantity))| {
            json!({
                "id": i + 1,
                "product": product,
                "quantity": quantity,
                "date_added": "2024-05-01T10:00:00Z",
                "get_total": null,
            })
        })
        .collect();
    json!({
        "id": id,
        "customer": 1,
        "date_ordered": "2024-05-01T10:00:00Z",
        "completed": false,
        "transaction_id": null,
        "shipping_address": { "address": "", "city": "", "state": "", "zipcode": "" },
        "orderitems": orderitems,
    })
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main St".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        zipcode: "411001".to_string(),
    }
}

pub fn payment_session_json(amount_minor: i64) -> Value {
    json!({
        "order_id": "order_ABC",
        "razorpay_key": "rzp_test_key",
        "amount": amount_minor,
        "currency": "INR",
        "name": "Shopfront",
        "description": "Order payment",
        "prefill": { "name": "alice", "email": "alice@example.com", "contact": "9999999999" },
    })
}

// =============================================================================
// Payment gateway double
// =============================================================================

/// A payment widget that answers with a fixed outcome and records the
/// sessions it was opened with.
pub struct ScriptedGateway {
    outcome: PaymentOutcome,
    seen: Mutex<Vec<PaymentSession>>,
}

impl ScriptedGateway {
    pub fn paying() -> Self {
        Self::new(PaymentOutcome::Completed(PaymentConfirmation {
            razorpay_payment_id: "pay_123".to_string(),
            razorpay_order_id: "order_ABC".to_string(),
            razorpay_signature: "sig_456".to_string(),
        }))
    }

    pub fn dismissing() -> Self {
        Self::new(PaymentOutcome::Dismissed)
    }

    fn new(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn sessions(&self) -> Vec<PaymentSession> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn collect(&self, session: &PaymentSession) -> Result<PaymentOutcome> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(session.clone());
        }
        Ok(self.outcome.clone())
    }
}
