//! Value serialization service
//!
//! Requests never carry raw Rust values; keys and values pass through a
//! [`ValueCodec`] that turns them into the protocol's encoded-value union.
//! The codec is constructed by the caller and handed to the client, so tests
//! can substitute their own.

use crate::error::CodecError;
use crate::pb;
use crate::protocol::Value;

/// Encode/decode capability used by the client for keys and values
pub trait ValueCodec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<pb::EncodedValue, CodecError>;

    fn decode(&self, encoded: &pb::EncodedValue) -> Result<Value, CodecError>;
}

/// Codec for the protobuf encoded-value union.
///
/// All scalar types are supported. JSON documents need an explicit codec
/// registration on the server, so they are only accepted once enabled with
/// [`ProtobufCodec::with_json_documents`].
#[derive(Clone, Debug, Default)]
pub struct ProtobufCodec {
    json_documents: bool,
}

impl ProtobufCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_documents(mut self) -> Self {
        self.json_documents = true;
        self
    }
}

impl ValueCodec for ProtobufCodec {
    fn encode(&self, value: &Value) -> Result<pb::EncodedValue, CodecError> {
        if matches!(value, Value::Json(_)) && !self.json_documents {
            return Err(CodecError::CodecNotRegistered("json"));
        }
        Ok(value.clone().into())
    }

    fn decode(&self, encoded: &pb::EncodedValue) -> Result<Value, CodecError> {
        let value = Value::from(encoded.clone());
        if matches!(value, Value::Json(_)) && !self.json_documents {
            return Err(CodecError::CodecNotRegistered("json"));
        }
        Ok(value)
    }
}

/// Encode an integer key in its decimal string form.
pub fn encode_key<C: ValueCodec + ?Sized>(
    codec: &C,
    key: i32,
) -> Result<pb::EncodedValue, CodecError> {
    codec.encode(&Value::String(key.to_string()))
}

/// Inverse of [`encode_key`]. Plain integer encodings are accepted too.
pub fn decode_key<C: ValueCodec + ?Sized>(
    codec: &C,
    encoded: &pb::EncodedValue,
) -> Result<i32, CodecError> {
    match codec.decode(encoded)? {
        Value::String(s) => s.parse().map_err(|_| CodecError::InvalidKey(s)),
        Value::Int(v) => Ok(v),
        other => Err(CodecError::TypeMismatch {
            expected: "string",
            actual: other.type_name(),
        }),
    }
}

/// Build a region entry from an already typed key and value.
pub fn create_entry<C: ValueCodec + ?Sized>(
    codec: &C,
    key: &Value,
    value: &Value,
) -> Result<pb::Entry, CodecError> {
    Ok(pb::Entry {
        key: Some(codec.encode(key)?),
        value: Some(codec.encode(value)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        let codec = ProtobufCodec::new();
        for key in [i32::MIN, -57, -1, 0, 1, 57, 10334, i32::MAX] {
            let encoded = encode_key(&codec, key).unwrap();
            assert_eq!(decode_key(&codec, &encoded).unwrap(), key);
        }
    }

    #[test]
    fn test_key_is_encoded_as_decimal_string() {
        let codec = ProtobufCodec::new();
        let encoded = encode_key(&codec, 42).unwrap();
        assert_eq!(
            encoded.value,
            Some(pb::encoded_value::Value::StringResult("42".to_string()))
        );
    }

    #[test]
    fn test_decode_key_rejects_garbage() {
        let codec = ProtobufCodec::new();
        let encoded: pb::EncodedValue = Value::String("forty-two".to_string()).into();
        assert_eq!(
            decode_key(&codec, &encoded),
            Err(CodecError::InvalidKey("forty-two".to_string()))
        );

        let encoded: pb::EncodedValue = Value::Boolean(true).into();
        assert!(matches!(
            decode_key(&codec, &encoded),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_json_requires_registration() {
        let doc = Value::Json(r#"{"name":"geode"}"#.to_string());

        let codec = ProtobufCodec::new();
        assert_eq!(
            codec.encode(&doc),
            Err(CodecError::CodecNotRegistered("json"))
        );

        let codec = ProtobufCodec::new().with_json_documents();
        let encoded = codec.encode(&doc).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), doc);
    }

    #[test]
    fn test_create_entry() {
        let codec = ProtobufCodec::new();
        let entry = create_entry(&codec, &Value::from("7"), &Value::from("value7")).unwrap();
        assert_eq!(codec.decode(&entry.key.unwrap()).unwrap(), Value::from("7"));
        assert_eq!(
            codec.decode(&entry.value.unwrap()).unwrap(),
            Value::from("value7")
        );
    }
}
