//! Order history.

use chrono::{DateTime, FixedOffset};
use shopfront_core::{Cart, CurrencyCode, OrderId, OrderStatus, Price};
use tracing::instrument;

use crate::api::ApiClient;
use crate::checkout::ShippingAddress;
use crate::error::{AppError, Result};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Payment id recorded when the payment was verified.
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub placed_at: Option<DateTime<FixedOffset>>,
    /// What was bought, at the prices the server reports now.
    pub items: Cart,
    pub shipping_address: Option<ShippingAddress>,
}

impl Order {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.item_count()
    }

    /// Recomputed from the lines.
    #[must_use]
    pub fn total(&self, currency: CurrencyCode) -> Price {
        self.items.total(currency)
    }
}

/// Reads the signed-in user's completed orders.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    api: ApiClient,
}

impl OrderHistory {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Completed orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] without a request when
    /// anonymous, otherwise the API error.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<Order>> {
        if !self.api.session().is_authenticated() {
            return Err(AppError::SignInRequired);
        }
        Ok(self.api.orders().await?)
    }
}
