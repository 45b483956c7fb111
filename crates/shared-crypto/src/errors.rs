//! Crypto error types.

use thiserror::Error;

/// Errors from key handling and signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Bytes do not encode a valid compressed secp256k1 point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Bytes do not encode a valid secret scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Bytes do not encode a valid r||s signature.
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// Signature does not match the message under the given key.
    #[error("signature verification failed")]
    VerificationFailed,

    /// Hex field could not be decoded.
    #[error("invalid hex in {field}")]
    InvalidHex { field: &'static str },
}
