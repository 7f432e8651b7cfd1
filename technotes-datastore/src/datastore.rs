//! The reactive preferences datastore.
//!
//! [`ReactivePreferencesDataStore`] combines an underlying [`KeyValueStore`]
//! with a type-handler registry, an LRU read cache, validation and a change
//! notifier. Every successful mutation publishes exactly one [`ChangeEvent`];
//! observers turn those events into streams of current values.
//!
//! Reads never fail: a missing key, a kind mismatch or a store error all
//! resolve to the caller's default. Writes report failures and leave both the
//! cache and the subscribers untouched when they do.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use technotes_core::{BufferPolicy, PreferencesConfig};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::cache::{CacheManager, DEFAULT_CACHE_SIZE};
use crate::codec::{JsonCodec, SerializationCodec};
use crate::error::{PreferencesError, Result, StoreError};
use crate::events::ChangeEvent;
use crate::handlers::TypeHandlerRegistry;
use crate::notifier::ChangeNotifier;
use crate::observer::{distinct_until_changed, ValueObserver};
use crate::store::{InMemoryStore, JsonFileStore, KeyValueStore};
use crate::validator::{DefaultValidator, Validator};
use crate::value::{PreferenceType, PreferenceValue};

/// Where store operations run.
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    /// On the calling task.
    #[default]
    Inline,
    /// Spawned onto the given runtime and awaited.
    Runtime(Handle),
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    handlers: TypeHandlerRegistry,
    cache: CacheManager,
    notifier: Arc<ChangeNotifier>,
    validator: Arc<dyn Validator>,
    codec: Arc<dyn SerializationCodec>,
}

impl Inner {
    async fn put_value(self: Arc<Self>, key: String, value: PreferenceValue) -> Result<()> {
        self.validator.validate_key(&key)?;
        self.validator.validate_value(&key, &value)?;

        let previous = self.existing_value(&key, &value).await?;
        self.write_through(&key, &value).await?;
        self.cache.put(&key, value.clone());

        let event = match previous {
            Some(old_value) => ChangeEvent::updated(key.as_str(), old_value, value),
            None => ChangeEvent::added(key.as_str(), value),
        };
        debug!(key = %key, "Preference written");
        self.notifier.notify_change(event);
        Ok(())
    }

    /// The value currently held for `key`, read as the kind of `incoming` when possible.
    async fn existing_value(&self, key: &str, incoming: &PreferenceValue) -> Result<Option<PreferenceValue>> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(Some(cached));
        }
        let stored = self
            .store
            .get(key)
            .await
            .map_err(|e| PreferencesError::storage("put", key, e))?;
        Ok(stored.map(|stored| {
            PreferenceValue::from_stored(key, stored.clone(), incoming.kind(), self.codec.as_ref())
                .unwrap_or_else(|_| PreferenceValue::infer_from_stored(stored, self.codec.as_ref()))
        }))
    }

    async fn write_through(&self, key: &str, value: &PreferenceValue) -> Result<()> {
        match self.handlers.resolve(value) {
            Some(handler) => handler
                .put(self.store.as_ref(), key, value)
                .await
                .map_err(|e| PreferencesError::storage("put", key, e)),
            None => {
                let stored = value
                    .to_stored(self.codec.as_ref())
                    .map_err(|source| PreferencesError::Serialization {
                        key: key.to_string(),
                        source,
                    })?;
                self.store
                    .put(key, stored)
                    .await
                    .map_err(|e| PreferencesError::storage("put", key, e))
            }
        }
    }

    async fn get_value(self: Arc<Self>, key: String, default: PreferenceValue) -> Result<PreferenceValue> {
        if let Some(cached) = self.cache.get(&key) {
            if cached.kind() == default.kind() {
                return Ok(cached);
            }
            debug!(key = %key, cached = %cached.kind(), requested = %default.kind(), "Cached kind differs, reading through");
        }

        match self.read_through(&key, &default).await {
            Ok(Some(value)) => {
                self.cache.put(&key, value.clone());
                Ok(value)
            }
            Ok(None) => Ok(default),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read preference, using default");
                Ok(default)
            }
        }
    }

    /// `None` when the key is absent.
    async fn read_through(&self, key: &str, default: &PreferenceValue) -> std::result::Result<Option<PreferenceValue>, StoreError> {
        if let Some(handler) = self.handlers.for_kind(default.kind()) {
            if !self.store.contains(key).await? {
                return Ok(None);
            }
            return handler.get(self.store.as_ref(), key, default.clone()).await.map(Some);
        }
        match self.store.get(key).await? {
            Some(stored) => PreferenceValue::from_stored(key, stored, default.kind(), self.codec.as_ref()).map(Some),
            None => Ok(None),
        }
    }

    async fn remove_value(self: Arc<Self>, key: String) -> Result<()> {
        self.validator.validate_key(&key)?;

        let previous = match self.cache.get(&key) {
            Some(cached) => Some(cached),
            None => self
                .store
                .get(&key)
                .await
                .map_err(|e| PreferencesError::storage("remove", key.as_str(), e))?
                .map(|stored| PreferenceValue::infer_from_stored(stored, self.codec.as_ref())),
        };
        let removed = self
            .store
            .remove(&key)
            .await
            .map_err(|e| PreferencesError::storage("remove", key.as_str(), e))?;
        self.cache.remove(&key);

        match previous {
            Some(old_value) if removed => {
                debug!(key = %key, "Preference removed");
                self.notifier.notify_change(ChangeEvent::removed(key, old_value));
            }
            _ => debug!(key = %key, "Remove of absent preference, nothing to notify"),
        }
        Ok(())
    }

    async fn clear_all(self: Arc<Self>) -> Result<()> {
        self.store
            .clear()
            .await
            .map_err(|e| PreferencesError::storage("clear", crate::events::ALL_KEYS, e))?;
        self.cache.clear();
        info!("All preferences cleared");
        self.notifier.notify_change(ChangeEvent::cleared());
        Ok(())
    }

    async fn contains_key(self: Arc<Self>, key: String) -> Result<bool> {
        if self.cache.contains_key(&key) {
            return Ok(true);
        }
        self.store
            .contains(&key)
            .await
            .map_err(|e| PreferencesError::storage("contains", key, e))
    }

    async fn keys(self: Arc<Self>) -> Result<Vec<String>> {
        self.store
            .keys()
            .await
            .map_err(|e| PreferencesError::storage("keys", crate::events::ALL_KEYS, e))
    }
}

/// Reactive key-value preferences store. Clones share the same state.
#[derive(Clone)]
pub struct ReactivePreferencesDataStore {
    inner: Arc<Inner>,
    observer: ValueObserver,
    executor: ExecutionContext,
}

impl ReactivePreferencesDataStore {
    pub fn builder() -> DataStoreBuilder {
        DataStoreBuilder::default()
    }

    /// Builds a datastore from configuration. A configured `storage_file` is
    /// opened as a [`JsonFileStore`]; otherwise preferences live in memory.
    pub async fn open(config: &PreferencesConfig) -> Result<Self> {
        let mut builder = Self::builder().from_config(config);
        if let Some(path) = &config.storage_file {
            let store = JsonFileStore::open(path.clone())
                .await
                .map_err(|e| PreferencesError::storage("open", path.display().to_string(), e))?;
            info!(path = %path.display(), "Opened preferences file");
            builder = builder.store(Arc::new(store));
        }
        Ok(builder.build())
    }

    async fn dispatch<T, Fut>(&self, operation: Fut) -> Result<T>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match &self.executor {
            ExecutionContext::Inline => operation.await,
            ExecutionContext::Runtime(handle) => handle
                .spawn(operation)
                .await
                .map_err(|e| PreferencesError::Dispatch(e.to_string()))?,
        }
    }

    pub async fn put_value(&self, key: &str, value: PreferenceValue) -> Result<()> {
        self.dispatch(self.inner.clone().put_value(key.to_string(), value)).await
    }

    /// Current value of `key`, or `default` when absent, unreadable or of another kind.
    pub async fn get_value(&self, key: &str, default: PreferenceValue) -> Result<PreferenceValue> {
        match self
            .dispatch(self.inner.clone().get_value(key.to_string(), default.clone()))
            .await
        {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Read dispatch failed, using default");
                Ok(default)
            }
        }
    }

    pub async fn remove_value(&self, key: &str) -> Result<()> {
        self.dispatch(self.inner.clone().remove_value(key.to_string())).await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.dispatch(self.inner.clone().clear_all()).await
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.dispatch(self.inner.clone().contains_key(key.to_string()))
            .await
            .unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Failed to check preference");
                false
            })
    }

    /// Stored keys in ascending order; empty if the store cannot be listed.
    pub async fn keys(&self) -> Vec<String> {
        self.dispatch(self.inner.clone().keys()).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list preference keys");
            Vec::new()
        })
    }

    pub async fn count(&self) -> usize {
        self.keys().await.len()
    }

    pub async fn put<T: PreferenceType>(&self, key: &str, value: T) -> Result<()> {
        self.put_value(key, value.into_value()).await
    }

    pub async fn get<T: PreferenceType>(&self, key: &str, default: T) -> T {
        match self.get_value(key, default.clone().into_value()).await {
            Ok(value) => T::from_value(value).unwrap_or(default),
            Err(_) => default,
        }
    }

    pub fn observe_value(&self, key: &str, default: PreferenceValue) -> BoxStream<'static, PreferenceValue> {
        let datastore = self.clone();
        let owned_key = key.to_string();
        let fallback = default.clone();
        self.observer.create_value_stream(key, default, move || {
            let datastore = datastore.clone();
            let key = owned_key.clone();
            let fallback = fallback.clone();
            async move { datastore.get_value(&key, fallback).await }
        })
    }

    pub fn observe_distinct_value(&self, key: &str, default: PreferenceValue) -> BoxStream<'static, PreferenceValue> {
        distinct_until_changed(self.observe_value(key, default))
    }

    pub fn observe<T: PreferenceType>(&self, key: &str, default: T) -> BoxStream<'static, T> {
        let datastore = self.clone();
        let owned_key = key.to_string();
        let fallback = default.clone();
        self.observer.create_value_stream(key, default, move || {
            let datastore = datastore.clone();
            let key = owned_key.clone();
            let fallback = fallback.clone();
            async move { Ok(datastore.get(&key, fallback).await) }
        })
    }

    pub fn observe_distinct<T: PreferenceType + PartialEq>(&self, key: &str, default: T) -> BoxStream<'static, T> {
        distinct_until_changed(self.observe(key, default))
    }

    /// The key set, re-emitted whenever it changes.
    pub fn observe_keys(&self) -> BoxStream<'static, Vec<String>> {
        let datastore = self.clone();
        let keys = self.observer.create_store_stream(Vec::new(), move || {
            let datastore = datastore.clone();
            async move { Ok(datastore.keys().await) }
        });
        distinct_until_changed(keys)
    }

    pub fn observe_count(&self) -> BoxStream<'static, usize> {
        distinct_until_changed(self.observe_keys().map(|keys| keys.len()).boxed())
    }

    /// Raw change events, for one key (plus clears) or for every key.
    pub fn observe_changes(&self, key: Option<&str>) -> BoxStream<'static, ChangeEvent> {
        match key {
            Some(key) => self.inner.notifier.observe_key_changes(key),
            None => self.inner.notifier.observe_changes(),
        }
    }

    pub fn cache_size(&self) -> usize {
        self.inner.cache.size()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.subscriber_count()
    }
}

impl std::fmt::Debug for ReactivePreferencesDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactivePreferencesDataStore")
            .field("handlers", &self.inner.handlers)
            .field("cache", &self.inner.cache)
            .field("notifier", &self.inner.notifier)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

pub struct DataStoreBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    executor: ExecutionContext,
    cache_size: usize,
    handlers: TypeHandlerRegistry,
    codec: Arc<dyn SerializationCodec>,
    validator: Option<Arc<dyn Validator>>,
    buffer_policy: BufferPolicy,
    limits: DefaultValidator,
}

impl Default for DataStoreBuilder {
    fn default() -> Self {
        Self {
            store: None,
            executor: ExecutionContext::Inline,
            cache_size: DEFAULT_CACHE_SIZE,
            handlers: TypeHandlerRegistry::with_primitives(),
            codec: Arc::new(JsonCodec),
            validator: None,
            buffer_policy: BufferPolicy::default(),
            limits: DefaultValidator::default(),
        }
    }
}

impl DataStoreBuilder {
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn execution_context(mut self, executor: ExecutionContext) -> Self {
        self.executor = executor;
        self
    }

    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn type_handlers(mut self, handlers: TypeHandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn codec(mut self, codec: Arc<dyn SerializationCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replaces the default validator. Takes precedence over configured limits.
    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn buffer_policy(mut self, policy: BufferPolicy) -> Self {
        self.buffer_policy = policy;
        self
    }

    /// Applies cache size, validation limits and buffering policy. The
    /// storage file is handled by [`ReactivePreferencesDataStore::open`].
    pub fn from_config(mut self, config: &PreferencesConfig) -> Self {
        self.cache_size = config.cache_size;
        self.buffer_policy = config.notification_buffer;
        self.limits = DefaultValidator::from_config(config);
        self
    }

    pub fn build(self) -> ReactivePreferencesDataStore {
        let notifier = Arc::new(ChangeNotifier::new(self.buffer_policy));
        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryStore::new()),
        };
        let validator: Arc<dyn Validator> = match self.validator {
            Some(validator) => validator,
            None => Arc::new(self.limits),
        };
        debug!(
            cache_size = self.cache_size,
            handlers = self.handlers.len(),
            policy = ?self.buffer_policy,
            "Building preferences datastore"
        );
        let inner = Arc::new(Inner {
            store,
            handlers: self.handlers,
            cache: CacheManager::new(self.cache_size),
            notifier: notifier.clone(),
            validator,
            codec: self.codec,
        });
        ReactivePreferencesDataStore {
            inner,
            observer: ValueObserver::new(notifier),
            executor: self.executor,
        }
    }
}
