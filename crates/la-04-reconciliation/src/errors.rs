//! Reconciliation error taxonomy.
//!
//! The engine classifies per-row failures into two fates: terminal errors
//! consume the row (the chain commitment is burned, retrying cannot help)
//! while everything else leaves the row for the next poll.

use la_01_protocol::ProtocolError;
use la_03_ledger_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The ledger store failed; transient, the row is retried.
    #[error("ledger store failure: {0}")]
    Store(#[from] StoreError),

    /// The row's action payload does not decode; terminal.
    #[error("payload decode failure: {0}")]
    Payload(#[from] ProtocolError),

    /// The row carries an action tag with no reconciliation semantics;
    /// terminal.
    #[error("action {action} has no on-chain semantics")]
    UnknownAction { action: u8 },

    /// A payment references an invoice that was never confirmed; terminal,
    /// a payment without a prior invoice is invalid by construction.
    #[error("invoice not found for payment: {invoice_hash}")]
    InvoiceNotFound { invoice_hash: String },

    /// The invoice's settlement value overflows u64; terminal, such an
    /// invoice can never settle.
    #[error("settlement value overflow for invoice {invoice_hash}: {quantity} x {price}")]
    ValueOverflow {
        invoice_hash: String,
        quantity: u64,
        price: u64,
    },

    /// The settlement transaction paid the wrong amount; terminal.
    #[error("payment value mismatch for invoice {invoice_hash}: expected {expected}, paid {paid}")]
    ValueMismatch {
        invoice_hash: String,
        expected: u64,
        paid: u64,
    },

    /// Escrow quantity disagrees with the confirmed invoice. Indicates a
    /// prior bug; surfaced loudly and the row is retained for inspection.
    #[error("escrow inconsistency for invoice {invoice_hash}: pending {pending}, invoice {expected}")]
    EscrowMismatch {
        invoice_hash: String,
        pending: u64,
        expected: u64,
    },
}

impl EngineError {
    /// Whether the on-chain row should be discarded rather than retried.
    pub fn is_terminal(&self) -> bool {
        match self {
            EngineError::Payload(_)
            | EngineError::UnknownAction { .. }
            | EngineError::InvoiceNotFound { .. }
            | EngineError::ValueOverflow { .. }
            | EngineError::ValueMismatch { .. } => true,
            EngineError::Store(_) | EngineError::EscrowMismatch { .. } => false,
        }
    }
}
