//! # Shared Types Crate
//!
//! Domain entities and common types shared across all Ledger-Anchor
//! subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem record types are
//!   defined here.
//! - **Content-Addressed Records**: Mints, invoices and offers are keyed by
//!   a deterministic SHA-256 content hash over their immutable fields, so
//!   the on-chain commitment is self-verifying against tampering.
//! - **Append-Only Balances**: A token balance is the sum of signed delta
//!   rows; rows are never updated in place.

pub mod entities;
pub mod time;
pub mod value;

pub use entities::*;
pub use time::{MockTimeSource, SystemTimeSource, TimeSource, Timestamp};
pub use value::{MetadataMap, MetadataValue};
