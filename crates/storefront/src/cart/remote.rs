//! Authenticated cart held by the server.

use async_trait::async_trait;
use shopfront_core::{Cart, CartAction, Product, ProductId};
use tracing::{debug, instrument};

use super::backend::CartBackend;
use crate::api::{ApiClient, ApiError};
use crate::error::Result;

/// Translates each mutation into single-unit `cart/update/` calls.
///
/// The server has no bulk quantity update, so removing a line of quantity N
/// is N sequential `remove` calls. The first failure stops the sequence and
/// is returned; units already removed stay removed.
#[derive(Debug, Clone)]
pub struct RemoteCart {
    api: ApiClient,
}

impl RemoteCart {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn remove_units(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        for sent in 0..quantity {
            self.api
                .update_cart(product_id, CartAction::Remove)
                .await
                .inspect_err(|e| {
                    debug!(
                        product_id = %product_id,
                        removed = sent,
                        requested = quantity,
                        error = %e,
                        "Unit removal stopped"
                    );
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl CartBackend for RemoteCart {
    /// A missing server cart is an empty cart.
    async fn fetch(&self) -> Result<Cart> {
        match self.api.cart().await {
            Ok(cart) => Ok(cart),
            Err(ApiError::NotFound(_)) => {
                debug!("No server cart, treating as empty");
                Ok(Cart::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn add(&self, product: &Product) -> Result<()> {
        Ok(self.api.update_cart(product.id, CartAction::Add).await?)
    }

    async fn decrease(&self, product_id: ProductId) -> Result<()> {
        Ok(self.api.update_cart(product_id, CartAction::Remove).await?)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_line(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        self.remove_units(product_id, quantity).await
    }

    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    async fn clear(&self, cart: &Cart) -> Result<()> {
        for line in cart.lines() {
            self.remove_units(line.product_id, line.quantity).await?;
        }
        Ok(())
    }
}
