//! On-chain correlation payloads.
//!
//! Only the minimal fields needed to bind a mined transaction to its
//! off-chain record go on chain; full metadata travels off-chain via
//! gossip or the API. The on-chain side is the binding commitment.

use serde::{Deserialize, Serialize};
use shared_types::Hash32;

use crate::{ActionType, MessageEnvelope, ProtocolError};

/// Current action payload version.
pub const PAYLOAD_VERSION: u8 = 1;

/// On-chain commitment for a mint: the content hash only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainMintMessage {
    pub version: u8,
    pub mint_hash: Hash32,
}

/// On-chain commitment for an invoice escrow request.
///
/// Carries the seller so the escrow decision can be made from chain data
/// alone, before the off-chain invoice record arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainInvoiceMessage {
    pub version: u8,
    pub invoice_hash: Hash32,
    pub mint_hash: Hash32,
    pub seller_address: String,
    pub quantity: u64,
}

/// On-chain settlement reference for an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainPaymentMessage {
    pub version: u8,
    pub invoice_hash: Hash32,
}

fn decode_payload<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    bincode::deserialize(bytes).map_err(|e| ProtocolError::PayloadDecode(e.to_string()))
}

fn check_version(version: u8) -> Result<(), ProtocolError> {
    if version > PAYLOAD_VERSION {
        return Err(ProtocolError::UnsupportedVersion {
            received: version,
            supported: PAYLOAD_VERSION,
        });
    }
    Ok(())
}

impl OnChainMintMessage {
    /// Decodes from raw payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let msg: Self = decode_payload(bytes)?;
        check_version(msg.version)?;
        Ok(msg)
    }
}

impl OnChainInvoiceMessage {
    /// Decodes from raw payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let msg: Self = decode_payload(bytes)?;
        check_version(msg.version)?;
        Ok(msg)
    }
}

impl OnChainPaymentMessage {
    /// Decodes from raw payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let msg: Self = decode_payload(bytes)?;
        check_version(msg.version)?;
        Ok(msg)
    }
}

/// Builds a ready-to-embed mint commitment envelope.
pub fn mint_envelope(mint_hash: Hash32) -> MessageEnvelope {
    let payload = OnChainMintMessage {
        version: PAYLOAD_VERSION,
        mint_hash,
    };
    MessageEnvelope::new(
        ActionType::Mint,
        bincode::serialize(&payload).expect("payload serialization is infallible"),
    )
}

/// Builds a ready-to-embed invoice commitment envelope.
pub fn invoice_envelope(
    invoice_hash: Hash32,
    mint_hash: Hash32,
    seller_address: &str,
    quantity: u64,
) -> MessageEnvelope {
    let payload = OnChainInvoiceMessage {
        version: PAYLOAD_VERSION,
        invoice_hash,
        mint_hash,
        seller_address: seller_address.to_string(),
        quantity,
    };
    MessageEnvelope::new(
        ActionType::Invoice,
        bincode::serialize(&payload).expect("payload serialization is infallible"),
    )
}

/// Builds a ready-to-embed payment settlement envelope.
pub fn payment_envelope(invoice_hash: Hash32) -> MessageEnvelope {
    let payload = OnChainPaymentMessage {
        version: PAYLOAD_VERSION,
        invoice_hash,
    };
    MessageEnvelope::new(
        ActionType::Payment,
        bincode::serialize(&payload).expect("payload serialization is infallible"),
    )
}
