//! # Gossip
//!
//! Off-chain record propagation between peers. The on-chain envelope only
//! carries hashes; the full record metadata travels here.
//!
//! Outbound: a polling publisher drains the store's un-gossiped records
//! through the [`transport::GossipTransport`] port, marking each one only
//! after the transport accepted it.
//!
//! Inbound: every peer record is admitted only after content-hash,
//! signature and derived-address verification, and lands as unconfirmed
//! state. Gossip can never move a balance on its own.

pub mod errors;
pub mod inbound;
pub mod publisher;
pub mod transport;

pub use errors::GossipError;
pub use inbound::InboundHandler;
pub use publisher::GossipPublisher;
pub use transport::{GossipTransport, LoopbackTransport};
