//! Checkout: shipping details, payment hand-off and order placement.
//!
//! The payment itself is collected by an external widget. This module opens
//! a payment session on the server, hands it to a [`PaymentGateway`], and
//! reports the gateway's confirmation back so the server can verify it and
//! close the order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopfront_core::OrderId;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, PaymentConfirmation, PaymentSession};
use crate::cart::CartEngine;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::validation::FieldErrors;

const MISSING_SHIPPING_DETAILS: &str = "Please fill out all shipping details.";

/// Where a physical order is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl ShippingAddress {
    /// Every field is required.
    ///
    /// # Errors
    ///
    /// Returns one error per blank field, all carrying the same message.
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in self.fields() {
            if value.trim().is_empty() {
                errors.push(field, MISSING_SHIPPING_DETAILS);
            }
        }
        errors.into_result()
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.trim().is_empty())
    }

    const fn fields(&self) -> [(&'static str, &String); 4] {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zipcode", &self.zipcode),
        ]
    }
}

/// What the payment widget reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The customer paid.
    Completed(PaymentConfirmation),
    /// The customer closed the widget without paying.
    Dismissed,
}

/// The external payment widget.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Collect payment for `session`.
    async fn collect(&self, session: &PaymentSession) -> Result<PaymentOutcome>;
}

/// Result of [`Checkout::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The server verified the payment and closed the order.
    Placed { order_id: OrderId },
    /// The customer backed out; the cart is unchanged.
    Dismissed,
}

/// Drives a checkout against the API.
#[derive(Debug, Clone)]
pub struct Checkout {
    api: ApiClient,
}

impl Checkout {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Check everything that can be checked before any request is sent.
    fn preflight(&self, cart: &CartEngine, address: &ShippingAddress) -> Result<()> {
        if !self.api.session().is_authenticated() {
            return Err(AppError::SignInRequired);
        }
        if cart.cart().is_empty() {
            return Err(AppError::EmptyCart);
        }
        address.validate().map_err(AppError::Validation)
    }

    /// Open a payment session for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`], [`AppError::EmptyCart`] or
    /// [`AppError::Validation`] before any request, or the API error if the
    /// server refuses.
    #[instrument(skip_all)]
    pub async fn start(
        &self,
        cart: &CartEngine,
        address: &ShippingAddress,
    ) -> Result<PaymentSession> {
        self.preflight(cart, address)?;
        add_breadcrumb("checkout", "Payment started", None);
        let session = self.api.start_payment().await?;
        info!(
            payment_order_id = %session.order_id,
            amount = session.amount,
            currency = %session.currency,
            "Payment session opened"
        );
        Ok(session)
    }

    /// Report a completed payment and refresh the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::PaymentVerification`] if the server does not
    /// accept the confirmation. A failed cart refresh afterwards is logged,
    /// not returned, since the order has been placed.
    #[instrument(skip_all, fields(payment_order_id = %confirmation.razorpay_order_id))]
    pub async fn confirm(
        &self,
        cart: &mut CartEngine,
        confirmation: &PaymentConfirmation,
        address: &ShippingAddress,
    ) -> Result<OrderId> {
        if !self.api.session().is_authenticated() {
            return Err(AppError::SignInRequired);
        }
        address.validate().map_err(AppError::Validation)?;

        let order_id = self
            .api
            .confirm_payment(confirmation, address)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized | ApiError::AuthExpired => AppError::Api(e),
                other => AppError::PaymentVerification(other),
            })?;
        info!(order_id = %order_id, "Order placed");

        if let Err(e) = cart.refresh().await {
            warn!(error = %e, "Cart refresh after order placement failed");
        }
        Ok(order_id)
    }

    /// The whole flow: validate, open a payment, let `gateway` collect it,
    /// then confirm.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start) and [`confirm`](Self::confirm); gateway
    /// errors are returned as-is.
    pub async fn run(
        &self,
        cart: &mut CartEngine,
        address: &ShippingAddress,
        gateway: &dyn PaymentGateway,
    ) -> Result<CheckoutOutcome> {
        let session = self.start(cart, address).await?;
        match gateway.collect(&session).await? {
            PaymentOutcome::Completed(confirmation) => {
                let order_id = self.confirm(cart, &confirmation, address).await?;
                Ok(CheckoutOutcome::Placed { order_id })
            }
            PaymentOutcome::Dismissed => {
                info!("Payment dismissed");
                Ok(CheckoutOutcome::Dismissed)
            }
        }
    }
}
