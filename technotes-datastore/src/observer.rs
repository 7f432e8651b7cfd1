//! Observable value streams driven by change notifications.
//!
//! A value stream first performs an explicit initial fetch, then re-runs its
//! getter once per relevant change event. The subscription to the notifier is
//! taken when the stream is created, so no change between creation and the
//! first poll is lost. Streams end only when dropped.

use async_stream::stream;
use futures_util::future;
use futures_util::stream::{BoxStream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::error::PreferencesError;
use crate::notifier::{ChangeNotifier, ChangeStream};

#[derive(Debug, Clone)]
pub struct ValueObserver {
    notifier: Arc<ChangeNotifier>,
}

impl ValueObserver {
    pub fn new(notifier: Arc<ChangeNotifier>) -> Self {
        Self { notifier }
    }

    /// Emits `getter()` now and after every change to `key` (including clears).
    /// A failing getter emits `default` instead.
    pub fn create_value_stream<T, G, Fut>(&self, key: &str, default: T, getter: G) -> BoxStream<'static, T>
    where
        T: Clone + Send + 'static,
        G: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, PreferencesError>> + Send + 'static,
    {
        let changes = self.notifier.observe_key_changes(key);
        drive(changes, key.to_string(), default, getter)
    }

    /// Like [`Self::create_value_stream`], without consecutive duplicates.
    pub fn create_distinct_value_stream<T, G, Fut>(&self, key: &str, default: T, getter: G) -> BoxStream<'static, T>
    where
        T: Clone + PartialEq + Send + 'static,
        G: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, PreferencesError>> + Send + 'static,
    {
        distinct_until_changed(self.create_value_stream(key, default, getter))
    }

    /// Emits `getter()` now and after any change to any key.
    pub fn create_store_stream<T, G, Fut>(&self, default: T, getter: G) -> BoxStream<'static, T>
    where
        T: Clone + Send + 'static,
        G: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, PreferencesError>> + Send + 'static,
    {
        let changes = self.notifier.observe_changes();
        drive(changes, crate::events::ALL_KEYS.to_string(), default, getter)
    }
}

fn drive<T, G, Fut>(mut changes: ChangeStream, key: String, default: T, getter: G) -> BoxStream<'static, T>
where
    T: Clone + Send + 'static,
    G: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, PreferencesError>> + Send + 'static,
{
    stream! {
        yield fetch(&key, default.clone(), &getter).await;
        while let Some(event) = changes.next().await {
            trace!(key = %key, event_key = %event.key(), "Change observed, refreshing value");
            yield fetch(&key, default.clone(), &getter).await;
        }
    }
    .boxed()
}

async fn fetch<T, G, Fut>(key: &str, default: T, getter: &G) -> T
where
    G: Fn() -> Fut,
    Fut: Future<Output = Result<T, PreferencesError>>,
{
    match getter().await {
        Ok(value) => value,
        Err(e) => {
            warn!(key = %key, error = %e, "Value getter failed, emitting default");
            default
        }
    }
}

/// Suppresses items equal to the previously emitted one.
pub fn distinct_until_changed<T>(stream: BoxStream<'static, T>) -> BoxStream<'static, T>
where
    T: Clone + PartialEq + Send + 'static,
{
    let mut last: Option<T> = None;
    stream
        .filter(move |item| {
            let changed = last.as_ref() != Some(item);
            if changed {
                last = Some(item.clone());
            }
            future::ready(changed)
        })
        .boxed()
}
