//! Underlying key-value stores.
//!
//! The datastore treats the physical store as an opaque capability set:
//! single-key reads and writes of primitive values, removal, a full wipe, and
//! key enumeration. Implementations are expected to make each single-key
//! operation atomic; no extra locking is layered on top.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::value::StoredValue;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError>;

    async fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError>;

    /// Returns `true` if the key was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// All keys currently stored, in ascending order.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}
