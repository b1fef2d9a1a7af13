//! Shopfront storefront client library.
//!
//! Talks to the store's REST API on behalf of one shopper:
//! - [`api`] - JSON-over-HTTP adapter with one-shot token refresh
//! - [`session`] - the access/refresh token pair, persisted locally
//! - [`cart`] - anonymous local mirror, server cart, and the merge at sign-in
//! - [`wishlist`], [`catalog`], [`orders`], [`checkout`], [`accounts`]
//! - [`state`] - the [`Storefront`] facade wiring all of the above together
//!
//! Front ends (the `shopfront` CLI, tests) drive the library through
//! [`Storefront`] and report failures through [`AppError`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod accounts;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod state;
pub mod storage;
pub mod validation;
pub mod wishlist;

pub use error::{AppError, ErrorKind, Result};
pub use state::Storefront;
