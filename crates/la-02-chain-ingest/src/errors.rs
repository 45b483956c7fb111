//! Chain ingestion error types.

use la_03_ledger_store::StoreError;
use thiserror::Error;

/// Errors surfaced while applying chain messages.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The ledger store rejected a write.
    #[error("ledger store failure: {0}")]
    Store(#[from] StoreError),
}
