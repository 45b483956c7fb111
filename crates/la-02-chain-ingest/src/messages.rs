//! Chain follower message contract.
//!
//! The follower (an external chain client) delivers these over a channel
//! in chain order: every block exactly once at each height, and a rollback
//! notice when the followed chain reorganizes.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Script classification for pay-to-pubkey-hash outputs.
pub const SCRIPT_TYPE_PUBKEYHASH: &str = "pubkeyhash";

/// Script classification for OP_RETURN data carriers.
pub const SCRIPT_TYPE_NULLDATA: &str = "nulldata";

/// One transaction output as reported by the follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Script classification, see the `SCRIPT_TYPE_*` constants.
    pub script_type: String,
    /// Addresses this output pays, empty for data carriers.
    pub addresses: Vec<Address>,
    /// Output value in koinu.
    pub value: u64,
    /// Raw script bytes. Only inspected for data carriers.
    pub script: Vec<u8>,
}

/// One chain transaction with its outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub tx_hash: String,
    pub outputs: Vec<TxOutput>,
}

/// A full block delivered by the follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub height: u64,
    pub block_hash: String,
    pub transactions: Vec<RawTransaction>,
}

/// Reorganization notice: every block at or above `height` is invalid.
/// `block_hash` is the hash of the last block both chains share; the
/// follower re-delivers replacement blocks from `height` upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackMessage {
    pub height: u64,
    pub block_hash: String,
}

/// The follower channel message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainMessage {
    Block(BlockMessage),
    Rollback(RollbackMessage),
}
