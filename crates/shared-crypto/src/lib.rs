//! # Shared Crypto
//!
//! secp256k1 primitives used for record identity across Ledger-Anchor.
//!
//! Every off-chain record (mint, invoice, offer) is signed by its author
//! and carries the author's compressed public key. Peers verify the
//! signature and compare the key's derived address against the record's
//! claimed actor address before accepting gossiped state.
//!
//! ## Properties
//!
//! - **secp256k1**: RFC 6979 deterministic signing, no RNG dependency
//! - **SHA-256 digests**: messages are hashed before signing

pub mod ecdsa;
pub mod errors;

pub use ecdsa::{derive_address, Keypair, PublicKey, Signature, ADDRESS_VERSION_BYTE};
pub use errors::CryptoError;
