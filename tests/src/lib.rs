//! # Ledger-Anchor Test Suite
//!
//! Unified test crate exercising the subsystems together:
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures: actors, blocks, wired nodes
//! └── integration/
//!     ├── protocol.rs        # Envelope codec over OP_RETURN scripts
//!     ├── ingestion.rs       # Blocks → rows → checkpoint
//!     ├── reconciliation.rs  # Full mint/escrow/settlement lifecycles
//!     └── gossip.rs          # Two-node propagation and spoof rejection
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo test -p la-tests
//! cargo test -p la-tests integration::reconciliation
//! ```

pub mod integration;
pub mod support;
