//! Preference values and their storage representation.
//!
//! [`PreferenceValue`] is what callers read and write. [`StoredValue`] is what an
//! underlying [`KeyValueStore`](crate::store::KeyValueStore) physically holds: the
//! six primitive kinds only. Structured values travel through the store as JSON
//! strings produced by a [`SerializationCodec`].

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::codec::SerializationCodec;
use crate::error::StoreError;

/// Closed set of value kinds. Type handlers are keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    Int,
    Long,
    Float,
    Double,
    Bool,
    String,
    Json,
}

impl PreferenceKind {
    pub fn is_primitive(self) -> bool {
        self != PreferenceKind::Json
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceKind::Int => "int",
            PreferenceKind::Long => "long",
            PreferenceKind::Float => "float",
            PreferenceKind::Double => "double",
            PreferenceKind::Bool => "bool",
            PreferenceKind::String => "string",
            PreferenceKind::Json => "json",
        }
    }
}

impl fmt::Display for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A preference value as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PreferenceValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    /// Structured value, persisted as a JSON-encoded string.
    Json(JsonValue),
}

impl PreferenceValue {
    pub fn kind(&self) -> PreferenceKind {
        match self {
            PreferenceValue::Int(_) => PreferenceKind::Int,
            PreferenceValue::Long(_) => PreferenceKind::Long,
            PreferenceValue::Float(_) => PreferenceKind::Float,
            PreferenceValue::Double(_) => PreferenceKind::Double,
            PreferenceValue::Bool(_) => PreferenceKind::Bool,
            PreferenceValue::String(_) => PreferenceKind::String,
            PreferenceValue::Json(_) => PreferenceKind::Json,
        }
    }

    /// Converts to the representation held by the underlying store.
    pub fn to_stored(&self, codec: &dyn SerializationCodec) -> Result<StoredValue, serde_json::Error> {
        Ok(match self {
            PreferenceValue::Int(v) => StoredValue::Int(*v),
            PreferenceValue::Long(v) => StoredValue::Long(*v),
            PreferenceValue::Float(v) => StoredValue::Float(*v),
            PreferenceValue::Double(v) => StoredValue::Double(*v),
            PreferenceValue::Bool(v) => StoredValue::Bool(*v),
            PreferenceValue::String(v) => StoredValue::String(v.clone()),
            PreferenceValue::Json(v) => StoredValue::String(codec.encode(v)?),
        })
    }

    /// Interprets a stored value as `expected`.
    ///
    /// JSON values are decoded from their string form; every other kind must
    /// match exactly.
    pub fn from_stored(
        key: &str,
        stored: StoredValue,
        expected: PreferenceKind,
        codec: &dyn SerializationCodec,
    ) -> Result<PreferenceValue, StoreError> {
        match (expected, stored) {
            (PreferenceKind::Json, StoredValue::String(raw)) => Ok(PreferenceValue::Json(codec.decode(&raw)?)),
            (expected, stored) if stored.kind() == expected => Ok(stored.into()),
            (expected, stored) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected,
                found: stored.kind(),
            }),
        }
    }

    /// Reads a stored value without a requested kind. Strings holding an
    /// encoded JSON object or array come back as structured values.
    pub fn infer_from_stored(stored: StoredValue, codec: &dyn SerializationCodec) -> PreferenceValue {
        if let StoredValue::String(raw) = &stored {
            if let Ok(json @ (JsonValue::Object(_) | JsonValue::Array(_))) = codec.decode(raw) {
                return PreferenceValue::Json(json);
            }
        }
        stored.into()
    }
}

impl From<StoredValue> for PreferenceValue {
    fn from(stored: StoredValue) -> Self {
        match stored {
            StoredValue::Int(v) => PreferenceValue::Int(v),
            StoredValue::Long(v) => PreferenceValue::Long(v),
            StoredValue::Float(v) => PreferenceValue::Float(v),
            StoredValue::Double(v) => PreferenceValue::Double(v),
            StoredValue::Bool(v) => PreferenceValue::Bool(v),
            StoredValue::String(v) => PreferenceValue::String(v),
        }
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::String(value.to_string())
    }
}

/// Physical representation inside an underlying key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
}

impl StoredValue {
    pub fn kind(&self) -> PreferenceKind {
        match self {
            StoredValue::Int(_) => PreferenceKind::Int,
            StoredValue::Long(_) => PreferenceKind::Long,
            StoredValue::Float(_) => PreferenceKind::Float,
            StoredValue::Double(_) => PreferenceKind::Double,
            StoredValue::Bool(_) => PreferenceKind::Bool,
            StoredValue::String(_) => PreferenceKind::String,
        }
    }
}

/// Rust types that can be read and written as a preference.
pub trait PreferenceType: Clone + Send + Sync + 'static {
    const KIND: PreferenceKind;

    fn into_value(self) -> PreferenceValue;

    /// Returns `None` if `value` is of another kind.
    fn from_value(value: PreferenceValue) -> Option<Self>;
}

macro_rules! impl_preference_type {
    ($ty:ty, $variant:ident) => {
        impl PreferenceType for $ty {
            const KIND: PreferenceKind = PreferenceKind::$variant;

            fn into_value(self) -> PreferenceValue {
                PreferenceValue::$variant(self)
            }

            fn from_value(value: PreferenceValue) -> Option<Self> {
                match value {
                    PreferenceValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for PreferenceValue {
            fn from(value: $ty) -> Self {
                PreferenceValue::$variant(value)
            }
        }
    };
}

impl_preference_type!(i32, Int);
impl_preference_type!(i64, Long);
impl_preference_type!(f32, Float);
impl_preference_type!(f64, Double);
impl_preference_type!(bool, Bool);
impl_preference_type!(String, String);
impl_preference_type!(JsonValue, Json);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::json;

    #[test]
    fn test_json_value_is_stored_as_string() {
        let value = PreferenceValue::Json(json!({"sort": "date", "ascending": false}));
        let stored = value.to_stored(&JsonCodec).unwrap();
        let StoredValue::String(raw) = &stored else {
            panic!("Expected string representation, got {:?}", stored);
        };
        assert!(raw.contains("\"sort\":\"date\""));

        let restored = PreferenceValue::from_stored("view", stored, PreferenceKind::Json, &JsonCodec).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn test_from_stored_rejects_kind_mismatch() {
        let err = PreferenceValue::from_stored("count", StoredValue::Bool(true), PreferenceKind::Int, &JsonCodec)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: PreferenceKind::Int, found: PreferenceKind::Bool, .. }
        ));
    }

    #[test]
    fn test_from_stored_rejects_corrupt_json() {
        let err = PreferenceValue::from_stored(
            "view",
            StoredValue::String("{not json".to_string()),
            PreferenceKind::Json,
            &JsonCodec,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
    }

    #[test]
    fn test_infer_from_stored() {
        let layout = PreferenceValue::Json(json!({"columns": 2}));
        let stored = layout.to_stored(&JsonCodec).unwrap();
        assert_eq!(PreferenceValue::infer_from_stored(stored, &JsonCodec), layout);

        let tags = PreferenceValue::Json(json!(["rust", "notes"]));
        assert_eq!(PreferenceValue::infer_from_stored(tags.to_stored(&JsonCodec).unwrap(), &JsonCodec), tags);

        // Plain and scalar-looking strings stay strings.
        assert_eq!(
            PreferenceValue::infer_from_stored(StoredValue::String("dark".to_string()), &JsonCodec),
            PreferenceValue::from("dark")
        );
        assert_eq!(
            PreferenceValue::infer_from_stored(StoredValue::String("42".to_string()), &JsonCodec),
            PreferenceValue::from("42")
        );
        assert_eq!(
            PreferenceValue::infer_from_stored(StoredValue::Long(9), &JsonCodec),
            PreferenceValue::Long(9)
        );
    }

    #[test]
    fn test_preference_type_conversions() {
        assert_eq!(42i32.into_value(), PreferenceValue::Int(42));
        assert_eq!(i64::from_value(PreferenceValue::Long(7)), Some(7));
        assert_eq!(bool::from_value(PreferenceValue::Int(1)), None);
        assert_eq!(<String as PreferenceType>::KIND, PreferenceKind::String);
        assert_eq!(PreferenceValue::from("dark"), PreferenceValue::String("dark".to_string()));
    }
}
