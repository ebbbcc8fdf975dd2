//! In-memory credential store.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::tokens::TokenPair;

/// Process-local [`CredentialStore`](super::CredentialStore).
///
/// The whole `Option<TokenPair>` sits behind one lock and is swapped
/// wholesale, so readers see either the old pair or the new one, never a
/// mix.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Option<TokenPair>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an externally issued pair.
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            inner: RwLock::new(Some(pair)),
        }
    }
}

#[async_trait]
impl super::CredentialStore for MemoryStore {
    async fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        let guard = self.inner.read().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn set(&self, pair: TokenPair) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        *guard = Some(pair);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        *guard = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Io {
        message: "credential store lock poisoned".to_string(),
    }
}
