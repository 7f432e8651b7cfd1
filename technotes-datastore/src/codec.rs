//! Serialization of structured preference values.

use serde_json::Value as JsonValue;

/// Encodes structured values to the string form kept in the store.
pub trait SerializationCodec: Send + Sync {
    fn encode(&self, value: &JsonValue) -> Result<String, serde_json::Error>;
    fn decode(&self, raw: &str) -> Result<JsonValue, serde_json::Error>;
}

/// Compact JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SerializationCodec for JsonCodec {
    fn encode(&self, value: &JsonValue) -> Result<String, serde_json::Error> {
        serde_json::to_string(value)
    }

    fn decode(&self, raw: &str) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
