//! Per-kind storage strategies.
//!
//! Each [`TypeHandler`] owns one primitive [`PreferenceKind`] and knows how to
//! move it in and out of a [`KeyValueStore`]. The [`TypeHandlerRegistry`] picks
//! the handler for a value; structured values have no handler and take the
//! JSON path in the datastore instead.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::KeyValueStore;
use crate::value::{PreferenceKind, PreferenceValue, StoredValue};

#[async_trait]
pub trait TypeHandler: Send + Sync {
    fn kind(&self) -> PreferenceKind;

    fn can_handle(&self, value: &PreferenceValue) -> bool {
        value.kind() == self.kind()
    }

    async fn put(&self, store: &dyn KeyValueStore, key: &str, value: &PreferenceValue) -> Result<(), StoreError>;

    /// Reads `key`, returning `default` if it is absent.
    async fn get(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
        default: PreferenceValue,
    ) -> Result<PreferenceValue, StoreError>;
}

macro_rules! primitive_handler {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        #[async_trait]
        impl TypeHandler for $name {
            fn kind(&self) -> PreferenceKind {
                PreferenceKind::$variant
            }

            async fn put(
                &self,
                store: &dyn KeyValueStore,
                key: &str,
                value: &PreferenceValue,
            ) -> Result<(), StoreError> {
                match value {
                    PreferenceValue::$variant(v) => store.put(key, StoredValue::$variant(v.clone())).await,
                    other => Err(StoreError::TypeMismatch {
                        key: key.to_string(),
                        expected: PreferenceKind::$variant,
                        found: other.kind(),
                    }),
                }
            }

            async fn get(
                &self,
                store: &dyn KeyValueStore,
                key: &str,
                default: PreferenceValue,
            ) -> Result<PreferenceValue, StoreError> {
                match store.get(key).await? {
                    None => Ok(default),
                    Some(StoredValue::$variant(v)) => Ok(PreferenceValue::$variant(v)),
                    Some(other) => Err(StoreError::TypeMismatch {
                        key: key.to_string(),
                        expected: PreferenceKind::$variant,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

primitive_handler!(IntHandler, Int);
primitive_handler!(LongHandler, Long);
primitive_handler!(FloatHandler, Float);
primitive_handler!(DoubleHandler, Double);
primitive_handler!(BooleanHandler, Bool);
primitive_handler!(
    /// Plain strings. Structured values are also strings in the store, but
    /// they never reach this handler.
    StringHandler,
    String
);

/// Ordered set of type handlers with a kind-keyed dispatch table.
///
/// Resolution consults the kind table first: the earliest handler registered
/// for a value's kind wins if it accepts the value. Only when no such handler
/// exists, or it declines, are handlers tried in registration order.
#[derive(Clone, Default)]
pub struct TypeHandlerRegistry {
    handlers: Vec<Arc<dyn TypeHandler>>,
    by_kind: HashMap<PreferenceKind, usize>,
}

impl TypeHandlerRegistry {
    /// A registry with no handlers; every value takes the JSON path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All six primitive handlers.
    pub fn with_primitives() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(IntHandler));
        registry.register(Arc::new(LongHandler));
        registry.register(Arc::new(FloatHandler));
        registry.register(Arc::new(DoubleHandler));
        registry.register(Arc::new(BooleanHandler));
        registry.register(Arc::new(StringHandler));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn TypeHandler>) {
        let index = self.handlers.len();
        self.by_kind.entry(handler.kind()).or_insert(index);
        self.handlers.push(handler);
    }

    /// The handler for `value`'s kind, else the first registered handler
    /// claiming it, else `None` for the JSON path.
    pub fn resolve(&self, value: &PreferenceValue) -> Option<&Arc<dyn TypeHandler>> {
        if let Some(handler) = self.by_kind.get(&value.kind()).map(|&i| &self.handlers[i]) {
            if handler.can_handle(value) {
                return Some(handler);
            }
        }
        self.handlers.iter().find(|h| h.can_handle(value))
    }

    /// Handler used to read a value of `kind`.
    pub fn for_kind(&self, kind: PreferenceKind) -> Option<&Arc<dyn TypeHandler>> {
        self.by_kind.get(&kind).map(|&i| &self.handlers[i])
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for TypeHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.kind()))
            .finish()
    }
}
