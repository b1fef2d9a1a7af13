//! Wire types for the REST API.
//!
//! Response DTOs are lenient: nullable columns on the server are `Option`
//! here and are resolved to domain values in `conversions`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CurrencyCode, OrderId, OrderItemId, Price, ProductId, UnknownCurrency, WishlistItemId};

// =============================================================================
// Catalog
// =============================================================================

/// A product as serialized by the server.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductDto {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub digital: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Promotional banner shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

// =============================================================================
// Cart, orders and wishlist
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderItemDto {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    #[serde(default)]
    pub product: Option<ProductDto>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// An order: the open cart or a completed purchase.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderDto {
    pub id: OrderId,
    #[serde(default)]
    pub date_ordered: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddressDto>,
    #[serde(default)]
    pub orderitems: Vec<OrderItemDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ShippingAddressDto {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WishlistItemDto {
    #[serde(default)]
    pub id: Option<WishlistItemId>,
    #[serde(default)]
    pub product: Option<ProductDto>,
}

// =============================================================================
// Authentication
// =============================================================================

/// `POST token/` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

/// `POST token/refresh/` response. `refresh` is present when the server
/// rotates refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// =============================================================================
// Payment
// =============================================================================

/// Details the external payment widget needs to collect a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Payment provider order id, echoed back in the confirmation.
    pub order_id: String,
    /// Public key the widget is opened with.
    pub razorpay_key: String,
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prefill: PaymentPrefill,
}

impl PaymentSession {
    /// The amount in the currency's standard unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is not one the storefront displays.
    pub fn amount_major(&self) -> Result<Price, UnknownCurrency> {
        let currency = self.currency.parse::<CurrencyCode>()?;
        Ok(Price::from_minor_units(self.amount, currency))
    }
}

/// Customer details pre-filled in the payment widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPrefill {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// What the payment widget hands back after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// `POST payment/success/` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PaymentSuccessResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub order_id: OrderId,
}
