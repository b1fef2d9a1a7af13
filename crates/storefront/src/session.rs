//! Session state: the single source of truth for "authenticated vs anonymous".
//!
//! A [`Session`] is created once at startup from the local store and handed
//! to the API client and the engines. Every transition (sign-in, token
//! renewal, sign-out, forced expiry) goes through it, so nothing else reads
//! credentials from storage directly.
//!
//! The credential pair is persisted under [`keys::ACCESS_TOKEN`] and
//! [`keys::REFRESH_TOKEN`]. A pair is only considered present when both keys
//! are set; a lone token left behind by an interrupted write is ignored.

use std::sync::{Arc, PoisonError, RwLock};

use shopfront_core::SessionCredential;
use tracing::{debug, info};

use crate::storage::{LocalStore, StorageError, keys};

/// Shared handle to the current credential. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn LocalStore>,
    credential: RwLock<Option<SessionCredential>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore the session persisted in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(store: Arc<dyn LocalStore>) -> Result<Self, StorageError> {
        let access = store.get(keys::ACCESS_TOKEN)?;
        let refresh = store.get(keys::REFRESH_TOKEN)?;
        let credential = match (access, refresh) {
            (Some(access), Some(refresh)) => Some(SessionCredential::new(access, refresh)),
            _ => None,
        };
        debug!(authenticated = credential.is_some(), "Session restored");
        Ok(Self::with_credential(store, credential))
    }

    /// An anonymous session over `store`, ignoring anything persisted.
    #[must_use]
    pub fn anonymous(store: Arc<dyn LocalStore>) -> Self {
        Self::with_credential(store, None)
    }

    fn with_credential(store: Arc<dyn LocalStore>, credential: Option<SessionCredential>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                credential: RwLock::new(credential),
            }),
        }
    }

    /// The store this session persists to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(Option::is_some)
    }

    /// A copy of the current credential pair.
    #[must_use]
    pub fn credential(&self) -> Option<SessionCredential> {
        self.read(Clone::clone)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(|c| c.as_ref().map(|c| c.access_token.clone()))
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|c| c.as_ref().map(|c| c.refresh_token.clone()))
    }

    /// Make `credential` the active pair, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be persisted; the in-memory
    /// session is left unchanged in that case.
    pub fn establish(&self, credential: SessionCredential) -> Result<(), StorageError> {
        self.persist(&credential)?;
        *self.write() = Some(credential);
        info!("Session established");
        Ok(())
    }

    /// Swap in a renewed access token (and rotated refresh token, if any).
    ///
    /// Returns `false` without touching storage when the session was cleared
    /// while the renewal was in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the renewed pair cannot be persisted.
    pub fn renew(
        &self,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<bool, StorageError> {
        let Some(current) = self.credential() else {
            return Ok(false);
        };
        let renewed = current.renewed(access_token, refresh_token);
        self.persist(&renewed)?;
        *self.write() = Some(renewed);
        debug!("Access token renewed");
        Ok(true)
    }

    /// Drop the credential pair, in memory first and then in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted tokens cannot be removed. The
    /// in-memory session is anonymous regardless.
    pub fn clear(&self) -> Result<(), StorageError> {
        let had_credential = self.write().take().is_some();
        self.inner.store.remove(keys::ACCESS_TOKEN)?;
        self.inner.store.remove(keys::REFRESH_TOKEN)?;
        if had_credential {
            info!("Session cleared");
        }
        Ok(())
    }

    fn persist(&self, credential: &SessionCredential) -> Result<(), StorageError> {
        self.inner
            .store
            .set(keys::ACCESS_TOKEN, &credential.access_token)?;
        self.inner
            .store
            .set(keys::REFRESH_TOKEN, &credential.refresh_token)
    }

    fn read<T>(&self, f: impl FnOnce(&Option<SessionCredential>) -> T) -> T {
        let guard = self
            .inner
            .credential
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<SessionCredential>> {
        self.inner
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
