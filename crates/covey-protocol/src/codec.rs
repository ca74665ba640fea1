//! Codec trait and the JSON implementation.
//!
//! The server never serializes messages directly; it goes through a
//! [`Codec`] so the connection handler stays independent of the format.
//! Browser clients speak JSON, so [`JsonCodec`] is the only codec shipped.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns wire messages into bytes and back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use covey_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec
///     .decode(br#"{"type":"disconnect","reason":"bye"}"#)
///     .unwrap();
/// assert_eq!(msg, ClientMessage::Disconnect { reason: "bye".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Envelope, ServerMessage};

    #[test]
    fn test_json_codec_encodes_envelope_as_utf8_json() {
        let bytes = JsonCodec
            .encode(&Envelope {
                seq: 3,
                message: ServerMessage::TownClosing,
            })
            .unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text, r#"{"seq":3,"message":{"type":"townClosing"}}"#);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<ServerMessage, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
