use serde_json::Value;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Malformed text at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Text does not describe a mapping")]
    NotAMapping,

    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Raw-text codec for node values
///
/// The textual format is a host concern; the editing core only requires
/// that `parse(serialize(value))` round-trips for well-formed values.
/// A node value must serialize to and parse from a mapping.
pub trait Codec {
    fn serialize(&self, value: &Value) -> CodecResult<String>;
    fn parse(&self, text: &str) -> CodecResult<Value>;
}

/// JSON codec, the format shipped with the editor
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> CodecResult<String> {
        serde_json::to_string_pretty(value).map_err(|err| CodecError::Serialize(err.to_string()))
    }

    fn parse(&self, text: &str) -> CodecResult<Value> {
        let value: Value = serde_json::from_str(text).map_err(|err| CodecError::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        })?;

        if !value.is_object() && !value.is_array() {
            return Err(CodecError::NotAMapping);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeSort;
    use crate::registry::Registry;
    use serde_json::json;

    #[test]
    fn test_round_trip_every_default_config() {
        let registry = Registry::new();
        let codec = JsonCodec;

        for sort in [NodeSort::Action, NodeSort::Condition] {
            for key in registry.type_keys(sort) {
                let descriptor = registry.lookup(sort, key).unwrap();
                let value = Value::Object(descriptor.default_config());

                let text = codec.serialize(&value).unwrap();
                let parsed = codec.parse(&text).unwrap();

                // Structural equality, not identity
                assert_eq!(parsed, value, "round trip failed for {:?}/{}", sort, key);
            }
        }
    }

    #[test]
    fn test_duration_round_trip() {
        let codec = JsonCodec;
        let value = json!({"delay": {"hours": 0, "minutes": 1, "seconds": 0}});

        let text = codec.serialize(&value).unwrap();
        assert_eq!(codec.parse(&text).unwrap(), value);
    }

    #[test]
    fn test_parse_error_carries_position() {
        let codec = JsonCodec;
        let err = codec.parse("{\"delay\": }").unwrap_err();

        match err {
            CodecError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_text_is_rejected() {
        let codec = JsonCodec;
        assert_eq!(codec.parse("42").unwrap_err(), CodecError::NotAMapping);
    }
}
