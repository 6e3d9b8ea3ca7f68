//! The session context handed to every API service

use log::{debug, info};
use std::fmt;
use std::sync::Arc;

use crate::claims::{self, Claims};
use crate::store::{MemoryTokenStore, TokenStore};
use crate::AuthError;

/// Explicit session context wrapping a [`TokenStore`]
///
/// Cloning is cheap and every clone shares the same store. Nothing is cached
/// here: each accessor re-reads the store and re-validates the token.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new<S: TokenStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_store(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// A session kept only in this process
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::in_memory())
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Persist a freshly issued token
    pub fn set_token(&self, token: &str) {
        self.store.set(token);
    }

    /// The stored token if it still looks usable
    ///
    /// A stored token that fails [`claims::is_valid`] is removed so it is
    /// never sent again.
    pub fn get_valid_token(&self) -> Option<String> {
        let token = self.store.get()?;

        if claims::is_valid(&token) {
            Some(token)
        } else {
            info!("Discarding stored token that is expired or malformed");
            self.store.remove();
            None
        }
    }

    /// Like [`Session::get_valid_token`] but says why there is no token
    pub fn require_token(&self) -> Result<String, AuthError> {
        let had_token = self.store.get().is_some();

        match self.get_valid_token() {
            Some(token) => Ok(token),
            None if had_token => Err(AuthError::ExpiredSession),
            None => Err(AuthError::MissingSession),
        }
    }

    /// Claims of the current valid token
    pub fn claims(&self) -> Option<Claims> {
        self.get_valid_token().and_then(|token| claims::decode(&token))
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_valid_token().is_some()
    }

    /// Forget the token (local logout)
    pub fn clear(&self) {
        debug!("Clearing session token");
        self.store.remove();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .finish()
    }
}
