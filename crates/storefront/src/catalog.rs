//! Product catalog queries.

use shopfront_core::{Product, ProductId};
use tracing::instrument;

use crate::api::{ApiClient, ApiError, Banner};
use crate::error::Result;

/// Searchable product listing. Remembers only the last query string.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
    last_query: Option<String>,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            last_query: None,
        }
    }

    /// List products matching `query`, or all products for `None` or a
    /// blank query.
    ///
    /// # Errors
    ///
    /// Returns the API error; there is no retry.
    #[instrument(skip(self))]
    pub async fn search(&mut self, query: Option<&str>) -> Result<Vec<Product>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.last_query = query.map(str::to_string);
        Ok(self.api.products(query).await?)
    }

    /// The query passed to the last [`search`](Self::search).
    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        Ok(self.api.product(id).await?)
    }

    /// The home page banner, `None` when none is configured.
    ///
    /// # Errors
    ///
    /// Returns the API error for anything other than not-found.
    pub async fn banner(&self) -> Result<Option<Banner>> {
        match self.api.banner().await {
            Ok(banner) => Ok(Some(banner)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
