//! # Ledger Store
//!
//! Storage contract for the tokenization ledger and the in-memory adapter
//! used by tests and single-node runs.
//!
//! State falls into four groups:
//!
//! - **On-chain rows**: recognized envelopes appended by chain ingestion
//!   and consumed exactly once by the reconciliation engine.
//! - **Records**: unconfirmed/confirmed mints and invoices, plus sell and
//!   buy offers.
//! - **Balances**: an append-only delta ledger and the escrow rows that
//!   reserve fractions against it.
//! - **Checkpoint**: the durable chain ingestion position.

pub mod errors;
pub mod memory;
pub mod ports;

pub use errors::StoreError;
pub use memory::InMemoryLedgerStore;
pub use ports::{LedgerStore, NewOnChainTransaction};
