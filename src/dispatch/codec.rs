//! Codec capability: request body encoding and response body decoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ERROR_MESSAGE_FIELD;
use crate::error_handling::CodecError;

/// Encodes request bodies and decodes success and error payloads.
///
/// The dispatcher is agnostic to the concrete schema: it only asks the codec
/// for a typed success value or for the human-readable message of an error
/// payload.
pub trait Codec: Send + Sync {
    /// Value of the `Content-Type` header for encoded bodies.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into a request body.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Parses a response body into the expected shape.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// Extracts the message from an error payload.
    fn decode_error_message(&self, bytes: &[u8]) -> Result<String, CodecError>;
}

/// JSON codec over `serde_json`.
///
/// Error payloads are JSON objects whose message lives in a configurable field
/// (`error_message` by default).
#[derive(Debug, Clone)]
pub struct JsonCodec {
    error_field: String,
}

impl JsonCodec {
    /// Codec reading error messages from `error_message`.
    pub fn new() -> Self {
        Self::with_error_field(ERROR_MESSAGE_FIELD)
    }

    /// Codec reading error messages from `field`.
    pub fn with_error_field(field: impl Into<String>) -> Self {
        JsonCodec {
            error_field: field.into(),
        }
    }

    /// Name of the field holding the error message.
    pub fn error_field(&self) -> &str {
        &self.error_field
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(Box::new(e)))
    }

    fn decode_error_message(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let payload: serde_json::Map<String, Value> =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(Box::new(e)))?;

        match payload.get(&self.error_field) {
            Some(Value::String(message)) => Ok(message.clone()),
            Some(Value::Null) | None => Err(CodecError::MissingField(self.error_field.clone())),
            // Numbers, arrays and objects are kept verbatim
            Some(other) => Ok(other.to_string()),
        }
    }
}
