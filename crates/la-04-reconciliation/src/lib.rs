//! # Reconciliation
//!
//! The poll-based engine that joins on-chain commitments with off-chain
//! records. Rows appended by chain ingestion are drained in chain order
//! and dispatched by action:
//!
//! - mint commitments promote off-chain mints and issue supply;
//! - invoice commitments reserve escrow and promote off-chain invoices;
//! - payment commitments settle confirmed invoices and move balance.
//!
//! The two retry policies are deliberate: a mint's off-chain half may
//! legitimately arrive late, so unmatched mint rows are retried; an
//! invoice's escrow decision can only get worse by waiting, so an
//! underfunded one is discarded outright.
//!
//! The [`sweeper::TimeoutSweeper`] releases escrow and retry backlog that
//! outlive the retention window.

pub mod engine;
pub mod errors;
pub mod invoice;
pub mod mint;
pub mod payment;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{ReconcileEngine, RowOutcome, TickSummary};
pub use errors::EngineError;
pub use invoice::InvoiceProcessor;
pub use mint::MintMatcher;
pub use payment::PaymentProcessor;
pub use sweeper::{SweepSummary, TimeoutSweeper};
