//! Application-facing facade over [`ReactivePreferencesDataStore`].
//!
//! Primitive preferences map directly onto their stored kind. Anything else
//! that implements `serde` traits is converted to JSON and stored through the
//! structured path.

use futures_util::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::datastore::ReactivePreferencesDataStore;
use crate::error::{PreferencesError, Result};
use crate::events::ChangeEvent;
use crate::value::{PreferenceType, PreferenceValue};

#[derive(Debug, Clone)]
pub struct ReactivePreferencesRepository {
    datastore: ReactivePreferencesDataStore,
}

/// Stands in for "no structured value": null values are never stored.
fn absent() -> PreferenceValue {
    PreferenceValue::Json(JsonValue::Null)
}

fn decode_or<T: DeserializeOwned>(key: &str, value: PreferenceValue, default: T) -> T {
    match value {
        PreferenceValue::Json(JsonValue::Null) => default,
        PreferenceValue::Json(json) => match serde_json::from_value(json) {
            Ok(decoded) => decoded,
            Err(source) => {
                let err = PreferencesError::Deserialization {
                    key: key.to_string(),
                    source,
                };
                warn!(error = %err, "Using default for undecodable preference");
                default
            }
        },
        _ => default,
    }
}

impl ReactivePreferencesRepository {
    pub fn new(datastore: ReactivePreferencesDataStore) -> Self {
        Self { datastore }
    }

    pub fn datastore(&self) -> &ReactivePreferencesDataStore {
        &self.datastore
    }

    pub async fn get<T: PreferenceType>(&self, key: &str, default: T) -> T {
        self.datastore.get(key, default).await
    }

    pub async fn put<T: PreferenceType>(&self, key: &str, value: T) -> Result<()> {
        self.datastore.put(key, value).await
    }

    pub fn observe<T: PreferenceType>(&self, key: &str, default: T) -> BoxStream<'static, T> {
        self.datastore.observe(key, default)
    }

    pub fn observe_distinct<T: PreferenceType + PartialEq>(&self, key: &str, default: T) -> BoxStream<'static, T> {
        self.datastore.observe_distinct(key, default)
    }

    pub async fn get_serializable<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.datastore.get_value(key, absent()).await {
            Ok(value) => decode_or(key, value, default),
            Err(_) => default,
        }
    }

    pub async fn put_serializable<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_value(value).map_err(|source| PreferencesError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.datastore.put_value(key, PreferenceValue::Json(json)).await
    }

    pub fn observe_serializable<T>(&self, key: &str, default: T) -> BoxStream<'static, T>
    where
        T: DeserializeOwned + Clone + Send + 'static,
    {
        let key = key.to_string();
        self.datastore
            .observe_value(&key, absent())
            .map(move |value| decode_or(&key, value, default.clone()))
            .boxed()
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.datastore.remove_value(key).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.datastore.clear_all().await
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.datastore.contains_key(key).await
    }

    pub fn observe_keys(&self) -> BoxStream<'static, Vec<String>> {
        self.datastore.observe_keys()
    }

    pub fn observe_count(&self) -> BoxStream<'static, usize> {
        self.datastore.observe_count()
    }

    pub fn observe_changes(&self) -> BoxStream<'static, ChangeEvent> {
        self.datastore.observe_changes(None)
    }

    pub fn observe_key_changes(&self, key: &str) -> BoxStream<'static, ChangeEvent> {
        self.datastore.observe_changes(Some(key))
    }
}
