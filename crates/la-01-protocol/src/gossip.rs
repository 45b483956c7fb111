//! Gossip payload encoding.
//!
//! Full record metadata travels peer-to-peer in these envelopes; the
//! transport itself (handshake, framing, reconnect) is external and only
//! sees `(tag, bytes)` pairs.

use serde::{Deserialize, Serialize};
use shared_types::{BuyOffer, Hash32, SellOffer, UnconfirmedInvoice, UnconfirmedMint};

use crate::{ProtocolError, PAYLOAD_VERSION};

/// Transport routing tag, one per gossip message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GossipTag {
    Mint,
    Invoice,
    SellOffer,
    BuyOffer,
    DeleteSellOffer,
    DeleteBuyOffer,
}

impl GossipTag {
    /// Stable tag name used by the transport.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mint => "Mint",
            Self::Invoice => "Invoice",
            Self::SellOffer => "SellOffer",
            Self::BuyOffer => "BuyOffer",
            Self::DeleteSellOffer => "DeleteSellOffer",
            Self::DeleteBuyOffer => "DeleteBuyOffer",
        }
    }
}

/// A peer-asserted record or offer-cancellation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GossipPayload {
    /// Off-chain mint assertion with full metadata.
    Mint(UnconfirmedMint),
    /// Off-chain invoice assertion.
    Invoice(UnconfirmedInvoice),
    /// Standing sell offer.
    SellOffer(SellOffer),
    /// Standing buy offer.
    BuyOffer(BuyOffer),
    /// Cancellation of a sell offer, signed by the offer's key.
    DeleteSellOffer {
        hash: Hash32,
        public_key: String,
        signature: String,
    },
    /// Cancellation of a buy offer, signed by the offer's key.
    DeleteBuyOffer {
        hash: Hash32,
        public_key: String,
        signature: String,
    },
}

impl GossipPayload {
    /// The transport tag this payload travels under.
    pub fn tag(&self) -> GossipTag {
        match self {
            Self::Mint(_) => GossipTag::Mint,
            Self::Invoice(_) => GossipTag::Invoice,
            Self::SellOffer(_) => GossipTag::SellOffer,
            Self::BuyOffer(_) => GossipTag::BuyOffer,
            Self::DeleteSellOffer { .. } => GossipTag::DeleteSellOffer,
            Self::DeleteBuyOffer { .. } => GossipTag::DeleteBuyOffer,
        }
    }
}

/// Versioned wrapper around a gossip payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GossipEnvelope {
    pub version: u8,
    pub payload: GossipPayload,
}

impl GossipEnvelope {
    /// Wraps `payload` at the current version.
    pub fn new(payload: GossipPayload) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            payload,
        }
    }

    /// Serializes to transport bytes.
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("gossip serialization is infallible")
    }

    /// Decodes from transport bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let envelope: Self =
            bincode::deserialize(bytes).map_err(|e| ProtocolError::PayloadDecode(e.to_string()))?;
        if envelope.version > PAYLOAD_VERSION {
            return Err(ProtocolError::UnsupportedVersion {
                received: envelope.version,
                supported: PAYLOAD_VERSION,
            });
        }
        Ok(envelope)
    }
}
