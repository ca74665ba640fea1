//! Error types for the protocol layer.
//!
//! Each Covey crate owns its error enum. A `ProtocolError` always means
//! bytes could not be turned into a message (or back), never that a town
//! or session rejected something.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// unknown `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is not valid at this point of the
    /// conversation, e.g. a movement update before `subscribe`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
