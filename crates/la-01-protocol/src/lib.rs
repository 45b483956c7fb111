//! # Protocol Subsystem
//!
//! The binary message-envelope protocol carried inside blockchain
//! `OP_RETURN` outputs, plus the typed action payloads inside it.
//!
//! ## Wire format
//!
//! ```text
//! byte 0-3: magic (big-endian u32)
//! byte 4:   action (1=Mint, 2=SellOffer, 3=BuyOffer, 4=Invoice, 5=Payment)
//! byte 5..: action payload (bincode, carries its own version field)
//! ```
//!
//! The version lives inside the action payload rather than the outer frame
//! so the 5-byte header stays stable across payload revisions.
//!
//! ## Protocol constraints
//!
//! - A magic mismatch means "not one of ours" and is a filtered value,
//!   never an error: unrelated outputs are everywhere on the chain.
//! - A transaction carries at most one protocol envelope; the first
//!   recognized output wins and any further envelope in the same
//!   transaction is ignored.

pub mod envelope;
pub mod errors;
pub mod gossip;
pub mod onchain;
pub mod op_return;

pub use envelope::{ActionType, Decoded, MessageEnvelope, MAGIC};
pub use errors::ProtocolError;
pub use gossip::{GossipEnvelope, GossipPayload, GossipTag};
pub use onchain::{
    invoice_envelope, mint_envelope, payment_envelope, OnChainInvoiceMessage, OnChainMintMessage,
    OnChainPaymentMessage, PAYLOAD_VERSION,
};
pub use op_return::{op_return_script, parse_op_return};
