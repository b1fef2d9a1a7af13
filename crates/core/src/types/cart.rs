//! Cart lines and the quantity arithmetic over them.
//!
//! [`Cart`] is the in-memory set of lines shared by both cart backends. It
//! owns the invariants every backend relies on:
//!
//! - a product appears on at most one line
//! - every line has a quantity of at least one; a line whose quantity would
//!   reach zero is removed instead
//! - the total is always the sum of `unit_price * quantity` over the lines,
//!   computed on demand so it can never drift from the lines themselves

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// One product in the cart together with how many units were chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub product: Product,
}

impl CartLine {
    /// A new line holding a single unit of `product`.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            product_id: product.id,
            quantity: 1,
            unit_price: product.price,
            product,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An ordered set of cart lines, keyed by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines received from elsewhere (server or disk).
    ///
    /// Lines with a zero quantity are dropped and repeated products are
    /// folded into the first line for that product, so the result always
    /// satisfies the cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match cart.line_mut(line.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Units of `product_id` currently in the cart (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    /// Add one unit of `product`, creating its line if needed.
    ///
    /// An existing line keeps its original snapshot and unit price.
    pub fn add_unit(&mut self, product: &Product) {
        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::new(product.clone())),
        }
    }

    /// Remove one unit of `product_id`, dropping the line when it empties.
    ///
    /// Returns `false` when the product was not in the cart.
    pub fn remove_unit(&mut self, product_id: ProductId) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return false;
        };
        let emptied = self.lines.get_mut(index).is_some_and(|line| {
            line.quantity = line.quantity.saturating_sub(1);
            line.quantity == 0
        });
        if emptied {
            self.lines.remove(index);
        }
        true
    }

    /// Remove the whole line for `product_id`, returning it.
    pub fn remove_line(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        Some(self.lines.remove(index))
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities over all lines (the cart-count badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Σ(unit price × quantity) over the lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The subtotal as a [`Price`] in `currency`.
    #[must_use]
    pub fn total(&self, currency: CurrencyCode) -> Price {
        Price::new(self.subtotal(), currency)
    }

    /// Whether any line holds a physical product.
    #[must_use]
    pub fn requires_shipping(&self) -> bool {
        self.lines.iter().any(|l| l.product.requires_shipping())
    }
}
