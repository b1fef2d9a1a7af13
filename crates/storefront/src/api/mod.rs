//! REST API client.
//!
//! # Architecture
//!
//! - Thin JSON-over-HTTP adapter built on `reqwest` 0.13
//! - The server is the source of truth for authenticated state; nothing is
//!   cached here
//! - Credentials come from the shared [`Session`](crate::session::Session)
//!   and are attached as a bearer token on authenticated requests
//!
//! # Token refresh
//!
//! An authenticated request that comes back 401 triggers exactly one
//! refresh (`POST token/refresh/`) followed by exactly one retry. If the
//! refresh is rejected or fails, or the retry is rejected again, the session
//! is cleared and the call fails with [`ApiError::AuthExpired`]. With no
//! refresh token to exchange the call fails with [`ApiError::Unauthorized`]
//! and the session is left alone.
//!
//! Public endpoints (catalog, banner, token issuance, registration) are
//! sent without a bearer token: the server rejects a stale token even on
//! endpoints that allow anonymous access.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api, session)?;
//! let products = client.products(Some("mug")).await?;
//! client.update_cart(products[0].id, CartAction::Add).await?;
//! let cart = client.cart().await?;
//! ```

mod client;
mod conversions;
mod endpoints;
pub mod types;

pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use endpoints::NewAccount;
pub use types::*;

use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::FieldErrors;

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server rejected the request and there is no refresh token to
    /// exchange.
    #[error("Not signed in")]
    Unauthorized,

    /// The credential was rejected and could not be renewed. The session has
    /// been cleared.
    #[error("Session expired")]
    AuthExpired,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the input.
    #[error("Bad request: {0}")]
    BadRequest(FieldErrors),

    /// Any other non-success status.
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Persisting a renewed credential failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether the error means the caller has to sign in again.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::AuthExpired)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
