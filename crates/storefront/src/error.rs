//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type returned by every storefront
//! operation. Each error maps to an [`ErrorKind`] that tells the caller how
//! to react, and offers a [`user_message`](AppError::user_message) that is
//! safe to show without leaking internal details.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::validation::FieldErrors;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Form input was rejected, locally or by the server.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Wrong username or password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The operation needs a signed-in session.
    #[error("Sign-in required")]
    SignInRequired,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The server could not verify a completed payment.
    #[error("Payment verification failed: {0}")]
    PaymentVerification(#[source] ApiError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credential was rejected and could not be renewed; the session
    /// has been cleared.
    AuthExpired,
    /// No credential is held for an operation that needs one.
    SignInRequired,
    /// The resource does not exist.
    NotFound,
    /// Transport failure or unexpected server response.
    NetworkOrServer,
    /// Input was rejected.
    Validation,
    /// The local mirror could not be read or written.
    Storage,
    /// The client is misconfigured.
    Configuration,
}

impl AppError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthorized => ErrorKind::SignInRequired,
                ApiError::AuthExpired => ErrorKind::AuthExpired,
                ApiError::NotFound(_) => ErrorKind::NotFound,
                ApiError::BadRequest(_) => ErrorKind::Validation,
                ApiError::Storage(_) => ErrorKind::Storage,
                ApiError::Http(_)
                | ApiError::Parse(_)
                | ApiError::Server { .. }
                | ApiError::InvalidUrl(_) => ErrorKind::NetworkOrServer,
            },
            Self::Storage(_) => ErrorKind::Storage,
            Self::Validation(_) | Self::InvalidCredentials | Self::EmptyCart => {
                ErrorKind::Validation
            }
            Self::SignInRequired => ErrorKind::SignInRequired,
            Self::PaymentVerification(_) => ErrorKind::NetworkOrServer,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the caller should send the user to sign in.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AuthExpired | ErrorKind::SignInRequired
        )
    }

    /// A short message that is safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        // Don't expose internal error details to users
        match self {
            Self::Validation(errors) | Self::Api(ApiError::BadRequest(errors))
                if !errors.is_empty() =>
            {
                errors.to_string()
            }
            Self::InvalidCredentials => "Invalid username or password.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::PaymentVerification(_) => {
                "Payment verification failed. Please contact support.".to_string()
            }
            _ => match self.kind() {
                ErrorKind::AuthExpired => {
                    "Your session has expired. Please sign in again.".to_string()
                }
                ErrorKind::SignInRequired => "Please sign in to continue.".to_string(),
                ErrorKind::NotFound => "The requested item could not be found.".to_string(),
                ErrorKind::NetworkOrServer => {
                    "The service is unavailable right now. Please try again later.".to_string()
                }
                ErrorKind::Validation => "Please check your input and try again.".to_string(),
                ErrorKind::Storage => {
                    "Could not save your data on this device.".to_string()
                }
                ErrorKind::Configuration => "The application is misconfigured.".to_string(),
            },
        }
    }

    /// Log the error and capture unexpected ones to Sentry.
    pub fn report(&self) {
        if matches!(
            self.kind(),
            ErrorKind::NetworkOrServer | ErrorKind::Storage | ErrorKind::Configuration
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, kind = ?self.kind(), "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful sign-in to associate errors with the user.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
