//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod credential;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use credential::SessionCredential;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use product::Product;
pub use status::{CartAction, OrderStatus};
pub use wishlist::{Wishlist, WishlistEntry};
