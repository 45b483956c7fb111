//! Gossip error types.

use la_01_protocol::ProtocolError;
use la_03_ledger_store::StoreError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors raised while publishing or admitting gossip.
#[derive(Debug, Error)]
pub enum GossipError {
    /// The inbound bytes do not decode as a gossip envelope.
    #[error("gossip decode failure: {0}")]
    Protocol(#[from] ProtocolError),

    /// Key or signature material is invalid, or verification failed.
    #[error("crypto failure: {0}")]
    Crypto(#[from] CryptoError),

    /// The record's hash field does not match its content.
    #[error("content hash mismatch for gossiped record {hash}")]
    HashMismatch { hash: String },

    /// The signing key does not derive the claimed actor address.
    #[error("address spoof: claimed {claimed}, key derives {derived}")]
    AddressMismatch { claimed: String, derived: String },

    /// A delete event is signed by a key other than the offer's.
    #[error("delete event key mismatch for offer {hash}")]
    KeyMismatch { hash: String },

    /// The ledger store rejected a write.
    #[error("ledger store failure: {0}")]
    Store(#[from] StoreError),

    /// The peer transport failed to accept an outbound message.
    #[error("transport failure: {message}")]
    Transport { message: String },
}
