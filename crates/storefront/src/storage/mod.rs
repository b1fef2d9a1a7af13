//! Durable client-side key/value storage.
//!
//! This is the client's equivalent of browser local storage: a small,
//! synchronous string store that survives restarts. It holds the session
//! tokens and the anonymous cart mirror.
//!
//! # Keys
//!
//! See [`keys`]. Values are plain strings; structured values are stored as
//! JSON via [`read_json`] and [`write_json`].
//!
//! # Implementations
//!
//! - [`FileStore`] - one file per key inside a state directory
//! - [`MemoryStore`] - process-local map, used by tests and ephemeral runs

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// Bearer token attached to authenticated requests.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Token exchanged for a fresh access token.
    pub const REFRESH_TOKEN: &str = "refreshToken";

    /// Anonymous cart mirror (JSON array of cart lines).
    pub const CART: &str = "cart";
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded.
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not valid JSON for the expected type.
    #[error("stored value for key '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A synchronous string key/value store.
///
/// Implementations must make `set` durable before returning: callers treat
/// a successful write as the point where the mirror matches memory.
pub trait LocalStore: Send + Sync {
    /// Read the value for `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if the stored text does not decode as `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

/// Encode and store a JSON value.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn LocalStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Keys become file names, so only a conservative alphabet is accepted.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
