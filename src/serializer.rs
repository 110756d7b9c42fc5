//! JSON serialization seam
//!
//! Encoders and decoders never reach for a global serializer. Whatever turns
//! header and payload objects into text (and back) is handed to them as an
//! `Arc<dyn JsonSerializer>` when they are built.

use crate::error::{Error, Result};
use serde_json::Value;

/// Object to JSON text conversion used for headers and payloads
///
/// Works on [`serde_json::Value`] so the trait stays object safe; typed
/// payloads go through `serde_json::to_value` / `from_value` around it.
pub trait JsonSerializer: Send + Sync {
    /// Serialize a JSON value to its textual form
    fn serialize(&self, value: &Value) -> Result<String>;

    /// Parse JSON text into a value
    fn deserialize(&self, json: &str) -> Result<Value>;
}

/// Compact serde_json serializer
///
/// Object members are written in insertion order, which keeps encoded
/// headers stable: extra headers first, then `typ`, then `alg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonSerializer;

impl JsonSerializer for SerdeJsonSerializer {
    fn serialize(&self, value: &Value) -> Result<String> {
        serde_json::to_string(value).map_err(|e| Error::JsonSerialization(e.to_string()))
    }

    fn deserialize(&self, json: &str) -> Result<Value> {
        serde_json::from_str(json).map_err(|e| Error::FormatInvalidJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_preserves_member_order() {
        let value = json!({"foo": "bar", "typ": "JWT", "alg": "HS256"});
        let text = SerdeJsonSerializer.serialize(&value).unwrap();
        assert_eq!(text, r#"{"foo":"bar","typ":"JWT","alg":"HS256"}"#);
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let result = SerdeJsonSerializer.deserialize("{not json");
        assert!(matches!(result, Err(Error::FormatInvalidJson(_))));
    }

    #[test]
    fn test_deserialize_round_trip_text() {
        let text = r#"{"FirstName":"Bob","Age":37}"#;
        let value = SerdeJsonSerializer.deserialize(text).unwrap();
        assert_eq!(SerdeJsonSerializer.serialize(&value).unwrap(), text);
    }
}
