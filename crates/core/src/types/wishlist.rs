//! Wishlist membership.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// A liked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub product: Product,
}

impl WishlistEntry {
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product_id: product.id,
            product,
        }
    }
}

/// A snapshot of wishlist membership.
///
/// A product id appears at most once; construction keeps the first entry
/// for each id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a snapshot, discarding repeated product ids.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = WishlistEntry>) -> Self {
        let mut unique: Vec<WishlistEntry> = Vec::new();
        for entry in entries {
            if !unique.iter().any(|e| e.product_id == entry.product_id) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries.iter().any(|e| e.product_id == product_id)
    }

    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn entry(id: i64, name: &str) -> WishlistEntry {
        WishlistEntry::new(Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::ONE,
            digital: false,
            image: None,
        })
    }

    #[test]
    fn test_from_entries_keeps_first_of_each_product() {
        let list = Wishlist::from_entries(vec![
            entry(1, "first"),
            entry(2, "other"),
            entry(1, "second"),
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries().first().map(|e| e.product.name.as_str()), Some("first"));
    }

    #[test]
    fn test_contains() {
        let list = Wishlist::from_entries(vec![entry(3, "x")]);
        assert!(list.contains(ProductId::new(3)));
        assert!(!list.contains(ProductId::new(4)));
        assert!(Wishlist::new().is_empty());
    }
}
