//! Shopfront Core - domain types for the storefront client.
//!
//! This crate provides the types shared by the client library and the CLI:
//! - product snapshots and prices
//! - cart lines and the quantity/total arithmetic over them
//! - wishlist membership
//! - the session credential pair
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no storage. Wire formats live in the storefront crate, which
//! converts API payloads into these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, carts, wishlists and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
