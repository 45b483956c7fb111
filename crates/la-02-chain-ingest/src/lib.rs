//! # Chain Ingestion
//!
//! Follows the anchoring blockchain and turns recognized protocol traffic
//! into durable on-chain transaction rows.
//!
//! Per block, for each transaction: take the first recognized envelope
//! among OP_RETURN outputs, the first pay-to-pubkey-hash address as the
//! acting party, and the per-address output values, then append a row.
//! The checkpoint advances only after every row of the block is durable.
//!
//! Rollback notices never unwind reconciled state; they are logged for
//! operator audit.

pub mod errors;
pub mod extract;
pub mod ingestor;
pub mod messages;

pub use errors::IngestError;
pub use extract::{envelope_from_tx, output_values, paying_address};
pub use ingestor::ChainIngestor;
pub use messages::{
    BlockMessage, ChainMessage, RawTransaction, RollbackMessage, TxOutput, SCRIPT_TYPE_NULLDATA,
    SCRIPT_TYPE_PUBKEYHASH,
};
