//! Reactive preferences datastore for TechNotes.
//!
//! Typed key-value preferences on top of a pluggable [`KeyValueStore`], with a
//! bounded read cache, validation, per-key change notifications and
//! observable value streams.
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use technotes_datastore::{ReactivePreferencesDataStore, ReactivePreferencesRepository};
//!
//! # async fn demo() -> technotes_datastore::Result<()> {
//! let repo = ReactivePreferencesRepository::new(ReactivePreferencesDataStore::builder().build());
//! let mut font_size = repo.observe_distinct("font_size", 12i32);
//! assert_eq!(font_size.next().await, Some(12));
//!
//! repo.put("font_size", 14i32).await?;
//! assert_eq!(font_size.next().await, Some(14));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod datastore;
pub mod error;
pub mod events;
pub mod handlers;
pub mod notifier;
pub mod observer;
pub mod repository;
pub mod store;
pub mod validator;
pub mod value;

#[cfg(test)]
mod datastore_tests;

pub use cache::CacheManager;
pub use codec::{JsonCodec, SerializationCodec};
pub use datastore::{DataStoreBuilder, ExecutionContext, ReactivePreferencesDataStore};
pub use error::{PreferencesError, Result, StoreError, ValidationError};
pub use events::ChangeEvent;
pub use handlers::{TypeHandler, TypeHandlerRegistry};
pub use notifier::ChangeNotifier;
pub use observer::ValueObserver;
pub use repository::ReactivePreferencesRepository;
pub use store::{InMemoryStore, JsonFileStore, KeyValueStore};
pub use validator::{DefaultValidator, Validator};
pub use value::{PreferenceKind, PreferenceType, PreferenceValue, StoredValue};

pub use technotes_core::BufferPolicy;
