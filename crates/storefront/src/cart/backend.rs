//! The storage seam the cart engine is written against.

use async_trait::async_trait;
use shopfront_core::{Cart, Product, ProductId};

use crate::error::Result;

/// Where cart lines live: the local mirror or the server.
///
/// Every mutation is one user intent. Implementations do not update any
/// in-memory view; the engine refetches after each call.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Current contents.
    async fn fetch(&self) -> Result<Cart>;

    /// Add one unit of `product`.
    async fn add(&self, product: &Product) -> Result<()>;

    /// Remove one unit of `product_id`; the line disappears at zero.
    async fn decrease(&self, product_id: ProductId) -> Result<()>;

    /// Remove the whole line. `quantity` is the line's quantity as last seen.
    async fn remove_line(&self, product_id: ProductId, quantity: u32) -> Result<()>;

    /// Remove every line of `cart`.
    async fn clear(&self, cart: &Cart) -> Result<()>;
}
