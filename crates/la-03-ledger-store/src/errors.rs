//! Ledger store error types.

use thiserror::Error;

/// Errors surfaced by [`crate::LedgerStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record the operation requires is not present.
    #[error("{kind} not found: {hash}")]
    NotFound { kind: &'static str, hash: String },

    /// A confirmed record with this hash already exists.
    #[error("{kind} already confirmed: {hash}")]
    AlreadyConfirmed { kind: &'static str, hash: String },

    /// No escrow row backs the invoice being settled.
    #[error("escrow missing for invoice {invoice_hash}")]
    EscrowMissing { invoice_hash: String },

    /// Backend failure (I/O, corruption, poisoned state).
    #[error("storage backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, hash: &shared_types::Hash32) -> Self {
        StoreError::NotFound {
            kind,
            hash: shared_types::hash_hex(hash),
        }
    }

    pub fn already_confirmed(kind: &'static str, hash: &shared_types::Hash32) -> Self {
        StoreError::AlreadyConfirmed {
            kind,
            hash: shared_types::hash_hex(hash),
        }
    }
}
