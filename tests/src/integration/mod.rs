//! Cross-subsystem integration tests.

pub mod gossip;
pub mod ingestion;
pub mod protocol;
pub mod reconciliation;
