//! Product snapshot carried by cart lines and wishlist entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as the catalog presented it at the time it was captured.
///
/// Anonymous carts persist this snapshot so they can render without a
/// network round-trip. Authenticated carts replace it on every refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the store currency's standard unit.
    pub price: Decimal,
    /// Digital goods need no shipping.
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Whether any physical shipping is needed for this product.
    #[must_use]
    pub const fn requires_shipping(&self) -> bool {
        !self.digital
    }
}
