//! Server-backed wishlist.
//!
//! Membership is answered from the last successful fetch only. Mutations
//! go to the server and are followed by a refetch; nothing is predicted
//! locally. Anonymous sessions have an empty wishlist and cannot change it.

use shopfront_core::{Product, ProductId, Wishlist};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{AppError, Result};

/// The signed-in user's liked products.
#[derive(Debug, Clone)]
pub struct WishlistStore {
    api: ApiClient,
    snapshot: Wishlist,
}

impl WishlistStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: Wishlist::new(),
        }
    }

    /// The last successful fetch.
    #[must_use]
    pub const fn snapshot(&self) -> &Wishlist {
        &self.snapshot
    }

    /// Whether `product_id` was in the last successful fetch.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.snapshot.contains(product_id)
    }

    /// Reload from the server.
    ///
    /// Anonymous sessions get an empty snapshot without a request. A missing
    /// wishlist is empty. Any other failure keeps the previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns the API error when the fetch fails.
    #[instrument(skip(self))]
    pub async fn fetch(&mut self) -> Result<&Wishlist> {
        if !self.api.session().is_authenticated() {
            self.snapshot = Wishlist::new();
            return Ok(&self.snapshot);
        }
        match self.api.wishlist().await {
            Ok(wishlist) => {
                debug!(entries = wishlist.len(), "Fetched wishlist");
                self.snapshot = wishlist;
            }
            Err(ApiError::NotFound(_)) => self.snapshot = Wishlist::new(),
            Err(e) => {
                warn!(error = %e, "Wishlist fetch failed, keeping previous snapshot");
                return Err(e.into());
            }
        }
        Ok(&self.snapshot)
    }

    /// Add `product` to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] without a request when anonymous,
    /// otherwise the first failing call.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&mut self, product: &Product) -> Result<()> {
        self.add_id(product.id).await
    }

    /// Add a product to the wishlist by id.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub async fn add_id(&mut self, product_id: ProductId) -> Result<()> {
        self.require_sign_in()?;
        self.api.wishlist_add(product_id).await?;
        self.fetch().await?;
        Ok(())
    }

    /// Remove `product_id` from the wishlist.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: ProductId) -> Result<()> {
        self.require_sign_in()?;
        self.api.wishlist_remove(product_id).await?;
        self.fetch().await?;
        Ok(())
    }

    /// Add when absent, remove when present, judged by the current snapshot.
    ///
    /// Returns whether the product is liked afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub async fn toggle(&mut self, product: &Product) -> Result<bool> {
        if self.is_in_wishlist(product.id) {
            self.remove(product.id).await?;
        } else {
            self.add(product).await?;
        }
        Ok(self.is_in_wishlist(product.id))
    }

    /// Forget the snapshot, e.g. on sign-out.
    pub fn clear(&mut self) {
        self.snapshot = Wishlist::new();
    }

    fn require_sign_in(&self) -> Result<()> {
        if self.api.session().is_authenticated() {
            Ok(())
        } else {
            Err(AppError::SignInRequired)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::Session;
    use crate::storage::MemoryStore;

    fn anonymous_store() -> WishlistStore {
        let session = Session::anonymous(Arc::new(MemoryStore::new()));
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap(), session).unwrap();
        WishlistStore::new(api)
    }

    #[tokio::test]
    async fn test_anonymous_fetch_is_empty_without_request() {
        let mut store = anonymous_store();
        assert!(store.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_mutation_requires_sign_in() {
        let mut store = anonymous_store();
        let product = Product {
            id: ProductId::new(1),
            name: "Lamp".to_string(),
            price: Decimal::new(10, 0),
            digital: false,
            image: None,
        };
        assert!(matches!(
            store.add(&product).await,
            Err(AppError::SignInRequired)
        ));
        assert!(matches!(
            store.remove(product.id).await,
            Err(AppError::SignInRequired)
        ));
        assert!(matches!(
            store.toggle(&product).await,
            Err(AppError::SignInRequired)
        ));
        assert!(!store.is_in_wishlist(product.id));
    }
}
