//! The fixed-header message envelope.

use crate::ProtocolError;

/// Engine identifier prefixed to every protocol message.
pub const MAGIC: u32 = 0x4C41_0001;

/// Minimum envelope length: 4-byte magic + 1 action byte.
const HEADER_LEN: usize = 5;

/// Protocol action tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionType {
    Mint = 1,
    SellOffer = 2,
    BuyOffer = 3,
    Invoice = 4,
    Payment = 5,
}

impl ActionType {
    /// Raw wire tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ActionType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mint),
            2 => Ok(Self::SellOffer),
            3 => Ok(Self::BuyOffer),
            4 => Ok(Self::Invoice),
            5 => Ok(Self::Payment),
            other => Err(ProtocolError::UnknownAction(other)),
        }
    }
}

/// A decoded protocol envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    /// Action tag.
    pub action: ActionType,
    /// Still-encoded action payload.
    pub payload: Vec<u8>,
}

impl MessageEnvelope {
    /// Builds a new envelope for `action` wrapping `payload`.
    pub fn new(action: ActionType, payload: Vec<u8>) -> Self {
        Self { action, payload }
    }

    /// Serializes to wire bytes: magic, action, payload verbatim.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.push(self.action.as_u8());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Decodes candidate envelope bytes.
    ///
    /// # Errors
    ///
    /// `MalformedEnvelope` if the input is shorter than the fixed header,
    /// `UnknownAction` if the magic matches but the action byte is unknown.
    pub fn decode(bytes: &[u8]) -> Result<Decoded, ProtocolError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::MalformedEnvelope { len: bytes.len() });
        }

        let magic = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Ok(Decoded::NotProtocol);
        }

        let action = ActionType::try_from(bytes[4])?;
        Ok(Decoded::Message(MessageEnvelope {
            action,
            payload: bytes[HEADER_LEN..].to_vec(),
        }))
    }
}

/// Outcome of decoding candidate envelope bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A protocol message addressed to this engine.
    Message(MessageEnvelope),
    /// Valid-length bytes that are not ours (magic mismatch). Callers
    /// must skip these, not fail.
    NotProtocol,
}
