use futures_util::stream::{BoxStream, StreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::datastore::{ExecutionContext, ReactivePreferencesDataStore};
use crate::error::{PreferencesError, StoreError, ValidationError};
use crate::events::ChangeEvent;
use crate::handlers::TypeHandlerRegistry;
use crate::store::{InMemoryStore, JsonFileStore, KeyValueStore, MockKeyValueStore};
use crate::value::{PreferenceValue, StoredValue};

fn datastore() -> ReactivePreferencesDataStore {
    ReactivePreferencesDataStore::builder().build()
}

async fn next<T>(stream: &mut BoxStream<'static, T>) -> T {
    timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("timed out waiting for item")
        .expect("stream ended")
}

async fn assert_silent<T>(stream: &mut BoxStream<'static, T>) {
    assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
}

#[tokio::test]
async fn test_primitive_round_trips() {
    let ds = datastore();
    ds.put("int", 42i32).await.unwrap();
    ds.put("long", 9_000_000_000i64).await.unwrap();
    ds.put("float", 1.5f32).await.unwrap();
    ds.put("double", 2.25f64).await.unwrap();
    ds.put("bool", true).await.unwrap();
    ds.put("string", "hello".to_string()).await.unwrap();

    assert_eq!(ds.get("int", 0i32).await, 42);
    assert_eq!(ds.get("long", 0i64).await, 9_000_000_000);
    assert_eq!(ds.get("float", 0.0f32).await, 1.5);
    assert_eq!(ds.get("double", 0.0f64).await, 2.25);
    assert!(ds.get("bool", false).await);
    assert_eq!(ds.get("string", String::new()).await, "hello");
    assert_eq!(ds.count().await, 6);
}

#[tokio::test]
async fn test_missing_key_returns_default() {
    let ds = datastore();
    assert_eq!(ds.get("absent", 7i32).await, 7);
    assert!(!ds.contains_key("absent").await);
    assert_eq!(ds.cache_size(), 0);
}

#[tokio::test]
async fn test_structured_value_goes_through_json_path() {
    let store = Arc::new(InMemoryStore::new());
    let ds = ReactivePreferencesDataStore::builder().store(store.clone()).build();
    let layout = json!({"columns": 2, "sidebar": "left"});

    ds.put_value("layout", PreferenceValue::Json(layout.clone())).await.unwrap();

    match store.get("layout").await.unwrap() {
        Some(StoredValue::String(raw)) => {
            assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), layout)
        }
        other => panic!("expected a JSON string in the store, got {:?}", other),
    }

    // Fresh datastore over the same store: the read must decode, not hit a cache.
    let reopened = ReactivePreferencesDataStore::builder().store(store).build();
    let value = reopened
        .get_value("layout", PreferenceValue::Json(serde_json::Value::Null))
        .await
        .unwrap();
    assert_eq!(value, PreferenceValue::Json(layout));
}

#[tokio::test]
async fn test_kind_mismatch_yields_default() {
    let ds = datastore();
    ds.put("font_size", 14i32).await.unwrap();
    assert_eq!(ds.get("font_size", "fallback".to_string()).await, "fallback");
    // The stored value is untouched.
    assert_eq!(ds.get("font_size", 0i32).await, 14);
}

#[tokio::test]
async fn test_put_emits_added_then_updated() {
    let ds = datastore();
    let mut changes = ds.observe_changes(None);

    ds.put("theme", "light".to_string()).await.unwrap();
    ds.put("theme", "dark".to_string()).await.unwrap();

    match next(&mut changes).await {
        ChangeEvent::ValueAdded { key, value, .. } => {
            assert_eq!(key, "theme");
            assert_eq!(value, PreferenceValue::String("light".to_string()));
        }
        other => panic!("expected ValueAdded, got {:?}", other),
    }
    match next(&mut changes).await {
        ChangeEvent::ValueUpdated { key, old_value, new_value, .. } => {
            assert_eq!(key, "theme");
            assert_eq!(old_value, PreferenceValue::String("light".to_string()));
            assert_eq!(new_value, PreferenceValue::String("dark".to_string()));
        }
        other => panic!("expected ValueUpdated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_of_uncached_value_reports_stored_old_value() {
    let store = Arc::new(InMemoryStore::with_entries([("volume", StoredValue::Int(3))]));
    let ds = ReactivePreferencesDataStore::builder().store(store).build();
    let mut changes = ds.observe_changes(Some("volume"));

    ds.put("volume", 4i32).await.unwrap();

    match next(&mut changes).await {
        ChangeEvent::ValueUpdated { old_value, new_value, .. } => {
            assert_eq!(old_value, PreferenceValue::Int(3));
            assert_eq!(new_value, PreferenceValue::Int(4));
        }
        other => panic!("expected ValueUpdated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_remove_emits_only_for_existing_keys() {
    let ds = datastore();
    ds.put("draft", true).await.unwrap();
    let mut changes = ds.observe_changes(None);

    ds.remove_value("never_written").await.unwrap();
    ds.remove_value("draft").await.unwrap();

    match next(&mut changes).await {
        ChangeEvent::ValueRemoved { key, old_value, .. } => {
            assert_eq!(key, "draft");
            assert_eq!(old_value, PreferenceValue::Bool(true));
        }
        other => panic!("expected ValueRemoved, got {:?}", other),
    }
    assert_silent(&mut changes).await;
    assert!(!ds.contains_key("draft").await);
    assert_eq!(ds.get("draft", false).await, false);
}

#[tokio::test]
async fn test_clear_all_emits_single_event() {
    let ds = datastore();
    for i in 0..5 {
        ds.put(&format!("k{}", i), i).await.unwrap();
    }
    let mut changes = ds.observe_changes(None);

    ds.clear_all().await.unwrap();

    assert!(next(&mut changes).await.is_store_cleared());
    assert_silent(&mut changes).await;
    assert_eq!(ds.count().await, 0);
    assert_eq!(ds.cache_size(), 0);
}

#[tokio::test]
async fn test_invalid_key_is_rejected_without_side_effects() {
    let ds = datastore();
    let mut changes = ds.observe_changes(None);

    let err = ds.put("   ", 1i32).await.unwrap_err();
    assert!(matches!(err, PreferencesError::Validation(ValidationError::BlankKey)));

    let long_key = "k".repeat(256);
    let err = ds.put(&long_key, 1i32).await.unwrap_err();
    assert!(err.is_validation());

    let err = ds.remove_value("").await.unwrap_err();
    assert!(err.is_validation());

    assert_silent(&mut changes).await;
    assert!(ds.keys().await.is_empty());
}

#[tokio::test]
async fn test_null_json_value_is_rejected() {
    let ds = datastore();
    let err = ds
        .put_value("layout", PreferenceValue::Json(serde_json::Value::Null))
        .await
        .unwrap_err();
    assert!(matches!(err, PreferencesError::Validation(ValidationError::NullValue { .. })));
}

#[tokio::test]
async fn test_failed_write_leaves_cache_and_subscribers_untouched() {
    let mut store = MockKeyValueStore::new();
    store.expect_get().returning(|_| Ok(None));
    store
        .expect_put()
        .times(1)
        .returning(|_, _| Err(StoreError::Unavailable("disk full".to_string())));
    let ds = ReactivePreferencesDataStore::builder().store(Arc::new(store)).build();
    let mut changes = ds.observe_changes(None);

    let err = ds.put("theme", "dark".to_string()).await.unwrap_err();

    match err {
        PreferencesError::Storage { operation, key, .. } => {
            assert_eq!(operation, "put");
            assert_eq!(key, "theme");
        }
        other => panic!("expected a storage error, got {:?}", other),
    }
    assert_eq!(ds.cache_size(), 0);
    assert_silent(&mut changes).await;
}

#[tokio::test]
async fn test_read_failure_yields_default() {
    let mut store = MockKeyValueStore::new();
    store
        .expect_contains()
        .returning(|_| Err(StoreError::Unavailable("locked".to_string())));
    store
        .expect_keys()
        .returning(|| Err(StoreError::Unavailable("locked".to_string())));
    let ds = ReactivePreferencesDataStore::builder().store(Arc::new(store)).build();

    assert_eq!(ds.get("font_size", 12i32).await, 12);
    assert!(ds.keys().await.is_empty());
    assert_eq!(ds.count().await, 0);
}

#[tokio::test]
async fn test_reads_survive_cache_eviction() {
    let ds = ReactivePreferencesDataStore::builder().cache_size(1).build();
    ds.put("a", 1i32).await.unwrap();
    ds.put("b", 2i32).await.unwrap();
    assert_eq!(ds.cache_size(), 1);

    assert_eq!(ds.get("a", 0i32).await, 1);
    assert_eq!(ds.get("b", 0i32).await, 2);
}

#[tokio::test]
async fn test_without_handlers_primitives_use_json_path() {
    let ds = ReactivePreferencesDataStore::builder()
        .type_handlers(TypeHandlerRegistry::empty())
        .build();
    ds.put("count", 5i32).await.unwrap();
    assert_eq!(ds.get("count", 0i32).await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_execution_context() {
    let ds = ReactivePreferencesDataStore::builder()
        .execution_context(ExecutionContext::Runtime(tokio::runtime::Handle::current()))
        .build();
    let mut changes = ds.observe_changes(Some("zoom"));

    ds.put("zoom", 1.25f64).await.unwrap();

    assert_eq!(ds.get("zoom", 1.0f64).await, 1.25);
    assert_eq!(next(&mut changes).await.key(), "zoom");
}

#[tokio::test]
async fn test_concurrent_writers_to_distinct_keys() {
    let ds = datastore();
    let writers: Vec<_> = (0..20)
        .map(|i| {
            let ds = ds.clone();
            tokio::spawn(async move { ds.put(&format!("key{:02}", i), i).await })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let keys = ds.keys().await;
    assert_eq!(keys.len(), 20);
    assert_eq!(keys.first().map(String::as_str), Some("key00"));
}

#[tokio::test]
async fn test_observe_keys_and_count() {
    let ds = datastore();
    let mut keys = ds.observe_keys();
    let mut count = ds.observe_count();
    assert!(next(&mut keys).await.is_empty());
    assert_eq!(next(&mut count).await, 0);

    ds.put("b", 1i32).await.unwrap();
    assert_eq!(next(&mut keys).await, vec!["b".to_string()]);
    assert_eq!(next(&mut count).await, 1);

    ds.put("a", 1i32).await.unwrap();
    assert_eq!(next(&mut keys).await, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(next(&mut count).await, 2);

    // Same key set: an update does not re-emit.
    ds.put("a", 2i32).await.unwrap();
    assert_silent(&mut keys).await;
    assert_silent(&mut count).await;
}

#[tokio::test]
async fn test_open_from_config_uses_storage_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = technotes_core::PreferencesConfig {
        storage_file: Some(dir.path().join("prefs.json")),
        ..Default::default()
    };

    let ds = ReactivePreferencesDataStore::open(&config).await.unwrap();
    ds.put("theme", "dark".to_string()).await.unwrap();
    drop(ds);

    let reopened = ReactivePreferencesDataStore::open(&config).await.unwrap();
    assert_eq!(reopened.get("theme", String::new()).await, "dark");
}

#[tokio::test]
async fn test_non_finite_numbers_never_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let store = JsonFileStore::open(&path).await.unwrap();
    let ds = ReactivePreferencesDataStore::builder().store(Arc::new(store)).build();
    let mut changes = ds.observe_changes(None);

    ds.put("theme", "dark".to_string()).await.unwrap();
    assert_eq!(next(&mut changes).await.key(), "theme");

    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = ds.put("ratio", value).await.unwrap_err();
        assert!(matches!(err, PreferencesError::Validation(ValidationError::NonFiniteNumber { .. })));
    }
    let err = ds.put("scale", f32::NAN).await.unwrap_err();
    assert!(err.is_validation());
    assert_silent(&mut changes).await;
    drop(ds);

    let reopened = JsonFileStore::open(&path).await.unwrap();
    let ds = ReactivePreferencesDataStore::builder().store(Arc::new(reopened)).build();
    assert_eq!(ds.keys().await, vec!["theme".to_string()]);
    assert_eq!(ds.get("theme", String::new()).await, "dark");
}

#[tokio::test]
async fn test_star_key_does_not_reach_other_key_observers() {
    let ds = datastore();
    let mut theme_changes = ds.observe_changes(Some("theme"));
    let mut theme = ds.observe("theme", "light".to_string());
    assert_eq!(next(&mut theme).await, "light");

    ds.put("*", 1i32).await.unwrap();
    ds.remove_value("*").await.unwrap();

    assert_silent(&mut theme_changes).await;
    assert_silent(&mut theme).await;
    assert_eq!(ds.get("*", 0i32).await, 0);

    ds.clear_all().await.unwrap();
    assert!(next(&mut theme_changes).await.is_store_cleared());
    assert_eq!(next(&mut theme).await, "light");
}

#[tokio::test]
async fn test_removed_structured_value_after_eviction_keeps_its_kind() {
    let ds = ReactivePreferencesDataStore::builder().cache_size(1).build();
    let layout = json!({"columns": 2});
    ds.put_value("layout", PreferenceValue::Json(layout.clone())).await.unwrap();
    ds.put("other", 1i32).await.unwrap();
    let mut changes = ds.observe_changes(Some("layout"));

    ds.remove_value("layout").await.unwrap();

    match next(&mut changes).await {
        ChangeEvent::ValueRemoved { key, old_value, .. } => {
            assert_eq!(key, "layout");
            assert_eq!(old_value, PreferenceValue::Json(layout));
        }
        other => panic!("expected ValueRemoved, got {:?}", other),
    }
}
