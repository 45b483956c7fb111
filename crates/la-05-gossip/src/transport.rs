//! Peer transport port.

use la_01_protocol::GossipTag;
use tokio::sync::mpsc;

use crate::errors::GossipError;

/// Outbound peer delivery.
///
/// Handshake, framing and reconnect live behind this port; the gossip
/// layer only hands over `(tag, bytes)` pairs. Delivery is best-effort
/// broadcast; a returned error means the message was not accepted for
/// sending and must not be marked gossiped.
pub trait GossipTransport: Send + Sync {
    fn send(&self, tag: GossipTag, bytes: &[u8]) -> Result<(), GossipError>;
}

/// In-process transport delivering into a channel.
///
/// Used by tests and single-process wiring: received pairs are fed
/// straight into an inbound handler.
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<(GossipTag, Vec<u8>)>,
}

impl LoopbackTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(GossipTag, Vec<u8>)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl GossipTransport for LoopbackTransport {
    fn send(&self, tag: GossipTag, bytes: &[u8]) -> Result<(), GossipError> {
        self.tx
            .send((tag, bytes.to_vec()))
            .map_err(|_| GossipError::Transport {
                message: "loopback receiver dropped".into(),
            })
    }
}
