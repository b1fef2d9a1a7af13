//! Typed wrappers for each REST endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use shopfront_core::{Cart, CartAction, Email, OrderId, Product, ProductId, SessionCredential, Wishlist};
use tracing::{debug, instrument};

use super::client::{ApiClient, ApiRequest};
use super::conversions::{convert_cart, convert_order, convert_product, convert_wishlist};
use super::types::{
    Banner, OrderDto, PaymentConfirmation, PaymentSession, PaymentSuccessResponse, ProductDto,
    TokenResponse, WishlistItemDto,
};
use super::ApiError;
use crate::checkout::ShippingAddress;
use crate::orders::Order;

/// Fields sent to `POST register/`.
#[derive(Debug)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub email: &'a Email,
    pub phone: &'a str,
    pub password: &'a SecretString,
}

impl ApiClient {
    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally filtered by a search string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, search: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let mut request = ApiRequest::get("products/").public();
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            request = request.query("search", term);
        }
        let products: Vec<ProductDto> = self.send_json(&request).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products.into_iter().map(convert_product).collect())
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let request = ApiRequest::get(format!("products/{id}/")).public();
        let product: ProductDto = self.send_json(&request).await?;
        Ok(convert_product(product))
    }

    /// Fetch the home page banner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no banner is configured.
    #[instrument(skip(self))]
    pub async fn banner(&self) -> Result<Banner, ApiError> {
        self.send_json(&ApiRequest::get("homepage-banner/").public())
            .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the open cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the server has no cart.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        let order: OrderDto = self.send_json(&ApiRequest::get("cart/")).await?;
        let cart = convert_cart(order.orderitems);
        debug!(order_id = %order.id, lines = cart.lines().len(), "Fetched cart");
        Ok(cart)
    }

    /// Add or remove a single unit of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, action = %action))]
    pub async fn update_cart(
        &self,
        product_id: ProductId,
        action: CartAction,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post(
            "cart/update/",
            json!({ "productId": product_id, "action": action }),
        );
        self.send(&request).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch the signed-in user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn wishlist(&self) -> Result<Wishlist, ApiError> {
        let items: Vec<WishlistItemDto> = self.send_json(&ApiRequest::get("wishlist/")).await?;
        Ok(convert_wishlist(items))
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn wishlist_add(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::post("wishlist/add/", json!({ "product_id": product_id }));
        self.send(&request).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn wishlist_remove(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::post("wishlist/remove/", json!({ "product_id": product_id }));
        self.send(&request).await?;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange a username and password for a credential pair.
    ///
    /// Does not touch the session; the caller decides what to do with the
    /// pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn obtain_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionCredential, ApiError> {
        let request = ApiRequest::post(
            "token/",
            json!({ "username": username, "password": password.expose_secret() }),
        )
        .public();
        let tokens: TokenResponse = self.send_json(&request).await?;
        Ok(SessionCredential::new(tokens.access, tokens.refresh))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] with the server's field errors when
    /// the account is rejected.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn register(&self, account: &NewAccount<'_>) -> Result<(), ApiError> {
        let request = ApiRequest::post(
            "register/",
            json!({
                "username": account.username,
                "email": account.email.as_str(),
                "phone": account.phone,
                "password": account.password.expose_secret(),
            }),
        )
        .public();
        self.send(&request).await?;
        Ok(())
    }

    // =========================================================================
    // Payment and orders
    // =========================================================================

    /// Open a payment for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when there is no open cart.
    #[instrument(skip(self))]
    pub async fn start_payment(&self) -> Result<PaymentSession, ApiError> {
        self.send_json(&ApiRequest::post("payment/start/", json!({})))
            .await
    }

    /// Report a completed payment so the server verifies it and closes the
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] when verification fails.
    #[instrument(
        skip(self, confirmation, address),
        fields(razorpay_order_id = %confirmation.razorpay_order_id)
    )]
    pub async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
        address: &ShippingAddress,
    ) -> Result<OrderId, ApiError> {
        let request = ApiRequest::post(
            "payment/success/",
            json!({
                "razorpay_payment_id": confirmation.razorpay_payment_id,
                "razorpay_order_id": confirmation.razorpay_order_id,
                "razorpay_signature": confirmation.razorpay_signature,
                "shipping_address": address,
            }),
        );
        let response: PaymentSuccessResponse = self.send_json(&request).await?;
        debug!(order_id = %response.order_id, status = ?response.status, "Payment confirmed");
        Ok(response.order_id)
    }

    /// Completed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let orders: Vec<OrderDto> = self.send_json(&ApiRequest::get("orders/")).await?;
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders.into_iter().map(convert_order).collect())
    }
}
