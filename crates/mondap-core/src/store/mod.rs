//! Durable credential storage.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::tokens::TokenPair;

/// Durable holder of the current credential pair.
///
/// Implementations must treat the pair as one unit: `set` replaces both
/// tokens and `clear` removes both, and a concurrent `get` never observes
/// one token from the old pair next to one from the new. The backing
/// medium (memory, disk, anything with get/set/clear semantics) is up to
/// the implementation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the current pair, or `None` when logged out.
    async fn get(&self) -> Result<Option<TokenPair>, StoreError>;

    /// Replace the stored pair atomically.
    async fn set(&self, pair: TokenPair) -> Result<(), StoreError>;

    /// Remove the stored pair atomically.
    async fn clear(&self) -> Result<(), StoreError>;
}
