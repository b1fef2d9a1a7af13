//! Anonymous cart kept in the local store.

use std::sync::Arc;

use async_trait::async_trait;
use shopfront_core::{Cart, Product, ProductId};
use tracing::{debug, warn};

use super::backend::CartBackend;
use crate::error::Result;
use crate::storage::{LocalStore, StorageError, keys, read_json, write_json};

/// The anonymous cart mirror under [`keys::CART`].
///
/// The whole line set is stored as one JSON array and rewritten after every
/// mutation. A mirror that no longer decodes is logged and treated as empty;
/// the next write replaces it.
#[derive(Clone)]
pub struct LocalCart {
    store: Arc<dyn LocalStore>,
}

impl std::fmt::Debug for LocalCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCart").finish_non_exhaustive()
    }
}

impl LocalCart {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Read the mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A corrupt value is not
    /// an error.
    pub fn load(&self) -> std::result::Result<Cart, StorageError> {
        match read_json::<Cart>(self.store.as_ref(), keys::CART) {
            Ok(cart) => Ok(cart.map(normalize).unwrap_or_default()),
            Err(StorageError::Corrupt { source, .. }) => {
                warn!(error = %source, "Discarding unreadable cart mirror");
                Ok(Cart::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrite the mirror with `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save(&self, cart: &Cart) -> std::result::Result<(), StorageError> {
        write_json(self.store.as_ref(), keys::CART, cart)?;
        debug!(lines = cart.lines().len(), "Cart mirror written");
        Ok(())
    }

    /// Delete the mirror entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub fn discard(&self) -> std::result::Result<(), StorageError> {
        self.store.remove(keys::CART)
    }

    fn update(&self, mutate: impl FnOnce(&mut Cart)) -> Result<()> {
        let mut cart = self.load()?;
        mutate(&mut cart);
        self.save(&cart)?;
        Ok(())
    }
}

/// Re-apply the cart invariants to a mirror written by something else.
fn normalize(cart: Cart) -> Cart {
    Cart::from_lines(cart.into_lines())
}

#[async_trait]
impl CartBackend for LocalCart {
    async fn fetch(&self) -> Result<Cart> {
        Ok(self.load()?)
    }

    async fn add(&self, product: &Product) -> Result<()> {
        self.update(|cart| cart.add_unit(product))
    }

    async fn decrease(&self, product_id: ProductId) -> Result<()> {
        self.update(|cart| {
            cart.remove_unit(product_id);
        })
    }

    async fn remove_line(&self, product_id: ProductId, _quantity: u32) -> Result<()> {
        self.update(|cart| {
            cart.remove_line(product_id);
        })
    }

    async fn clear(&self, _cart: &Cart) -> Result<()> {
        self.update(Cart::clear)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(price, 0),
            digital: false,
            image: None,
        }
    }

    fn local() -> (Arc<MemoryStore>, LocalCart) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), LocalCart::new(store))
    }

    #[tokio::test]
    async fn test_add_writes_mirror() {
        let (store, cart) = local();
        let a = product(1, 100);
        cart.add(&a).await.unwrap();
        cart.add(&a).await.unwrap();

        let fetched = cart.fetch().await.unwrap();
        assert_eq!(fetched.quantity_of(a.id), 2);
        assert_eq!(fetched.subtotal(), Decimal::new(200, 0));
        assert!(store.get(keys::CART).unwrap().unwrap().contains("\"quantity\":2"));
    }

    #[tokio::test]
    async fn test_decrease_drops_line_at_zero() {
        let (_store, cart) = local();
        let a = product(1, 100);
        cart.add(&a).await.unwrap();
        cart.decrease(a.id).await.unwrap();
        assert!(cart.fetch().await.unwrap().is_empty());

        // Decreasing an absent product is harmless.
        cart.decrease(a.id).await.unwrap();
        assert!(cart.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_line_and_clear() {
        let (_store, cart) = local();
        let a = product(1, 100);
        let b = product(2, 50);
        for _ in 0..3 {
            cart.add(&a).await.unwrap();
        }
        cart.add(&b).await.unwrap();

        cart.remove_line(a.id, 3).await.unwrap();
        let fetched = cart.fetch().await.unwrap();
        assert_eq!(fetched.quantity_of(a.id), 0);
        assert_eq!(fetched.quantity_of(b.id), 1);

        cart.clear(&fetched).await.unwrap();
        assert!(cart.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_mirror_reads_as_empty() {
        let (store, cart) = local();
        store.set(keys::CART, "{\"not\":\"an array\"").unwrap();
        assert!(cart.fetch().await.unwrap().is_empty());

        cart.add(&product(1, 10)).await.unwrap();
        assert_eq!(cart.fetch().await.unwrap().item_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_on_disk_are_dropped() {
        let (store, cart) = local();
        store
            .set(
                keys::CART,
                r#"[{"productId":1,"quantity":0,"unitPrice":"5.00","product":{"id":1,"name":"A","price":"5.00"}}]"#,
            )
            .unwrap();
        assert!(cart.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discard_removes_key() {
        let (store, cart) = local();
        cart.add(&product(1, 10)).await.unwrap();
        cart.discard().unwrap();
        assert!(store.get(keys::CART).unwrap().is_none());
    }
}
