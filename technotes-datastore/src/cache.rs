//! Bounded in-memory cache in front of the underlying store.
//!
//! The cache is never the source of truth: everything in it can be rebuilt by
//! reading the store again.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::trace;

use crate::value::PreferenceValue;

pub const DEFAULT_CACHE_SIZE: usize = 200;

/// Least-recently-used cache of preference values.
///
/// Both `put` and `get` refresh an entry's recency; `contains_key` does not.
#[derive(Debug)]
pub struct CacheManager {
    entries: Mutex<LruCache<String, PreferenceValue>>,
}

impl CacheManager {
    /// A capacity of zero is clamped to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn put(&self, key: &str, value: PreferenceValue) {
        let mut entries = self.entries.lock();
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            if let Some((evicted, _)) = entries.peek_lru() {
                trace!(key = %evicted, "Evicting least recently used cache entry");
            }
        }
        entries.put(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.entries.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<PreferenceValue> {
        self.entries.lock().pop(key)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
