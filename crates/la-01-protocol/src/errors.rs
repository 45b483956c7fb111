//! Protocol error types.

use thiserror::Error;

/// Errors from envelope and payload codecs.
///
/// A magic mismatch is deliberately *not* represented here: it is a
/// filtered value (`Decoded::NotProtocol`), not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Input shorter than the fixed 5-byte header.
    #[error("malformed envelope: {len} bytes, need at least 5")]
    MalformedEnvelope { len: usize },

    /// Action byte is not a known action.
    #[error("unknown action: {0}")]
    UnknownAction(u8),

    /// Action payload failed to decode.
    #[error("payload decode failed: {0}")]
    PayloadDecode(String),

    /// Payload version is newer than this node understands.
    #[error("unsupported payload version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u8, supported: u8 },
}
