//! ECDSA signatures (secp256k1) and address derivation.
//!
//! Signing is RFC 6979 deterministic over the SHA-256 digest of the
//! message bytes. Public keys travel hex-encoded in record fields;
//! signatures travel hex-encoded in the 64-byte r||s format.

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature as EcdsaSignature, SigningKey, VerifyingKey,
};
use sha2::{Digest, Sha256};

use crate::CryptoError;

/// Version byte prefixed to derived addresses.
pub const ADDRESS_VERSION_BYTE: u8 = 0x1E;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Creates from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Parses a hex-encoded compressed public key.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text).map_err(|_| CryptoError::InvalidHex {
            field: "public_key",
        })?;
        let bytes: [u8; 33] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(bytes)
    }

    /// Raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Hex encoding of the compressed key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verifies a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig =
            EcdsaSignature::from_slice(&signature.0).map_err(|_| CryptoError::InvalidSignature)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    /// Derives the chain address for this key, see [`derive_address`].
    pub fn to_address(&self) -> String {
        derive_address(&self.0)
    }
}

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Creates from raw r||s bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parses a hex-encoded signature.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text).map_err(|_| CryptoError::InvalidHex { field: "signature" })?;
        let bytes: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// secp256k1 keypair.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Creates from secret key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// The compressed public key.
    pub fn public_key(&self) -> PublicKey {
        let sec1 = self.signing_key.verifying_key().to_sec1_bytes();
        let mut bytes = [0u8; 33];
        // SEC1 compressed keys are always exactly 33 bytes.
        bytes.copy_from_slice(&sec1[..33]);
        PublicKey(bytes)
    }

    /// The derived chain address for this keypair.
    pub fn address(&self) -> String {
        self.public_key().to_address()
    }

    /// Signs `message` (RFC 6979 deterministic, SHA-256 prehash).
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.signing_key.sign(message);
        Signature(sig.to_bytes().into())
    }
}

/// Derives the chain address for a compressed public key.
///
/// `version_byte || sha256(sha256(pubkey))[..20]`, hex-encoded with an `A`
/// prefix. The derivation is deterministic, so peers can bind a public key
/// to a claimed actor address without any wallet machinery.
pub fn derive_address(pubkey: &[u8; 33]) -> String {
    let first = Sha256::digest(pubkey);
    let second = Sha256::digest(first);
    let mut payload = Vec::with_capacity(21);
    payload.push(ADDRESS_VERSION_BYTE);
    payload.extend_from_slice(&second[..20]);
    format!("A{}", hex::encode(payload))
}
