use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::StoreError;
use crate::value::StoredValue;

/// Volatile store backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, StoredValue>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, StoredValue)>,
        K: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = InMemoryStore::new();
        store.put("font_size", StoredValue::Int(14)).await.unwrap();

        assert_eq!(store.get("font_size").await.unwrap(), Some(StoredValue::Int(14)));
        assert!(store.contains("font_size").await.unwrap());
        assert!(store.remove("font_size").await.unwrap());
        assert!(!store.remove("font_size").await.unwrap());
        assert_eq!(store.get("font_size").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_sorted_and_clear_empties() {
        let store = InMemoryStore::with_entries([
            ("b", StoredValue::Bool(true)),
            ("a", StoredValue::String("x".to_string())),
        ]);
        assert_eq!(store.keys().await.unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }
}
