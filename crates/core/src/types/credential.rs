//! Session credential pair.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The access/refresh token pair issued at sign-in.
///
/// Holding one of these is what makes a session authenticated. Implements
/// `Debug` manually so tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Short-lived bearer token attached to every request.
    pub access_token: String,
    /// Long-lived token exchanged for a new access token on expiry.
    pub refresh_token: String,
}

impl SessionCredential {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// The same pair with a renewed access token and, when the server rotated
    /// it, a new refresh token.
    #[must_use]
    pub fn renewed(&self, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token: refresh_token.unwrap_or_else(|| self.refresh_token.clone()),
        }
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
