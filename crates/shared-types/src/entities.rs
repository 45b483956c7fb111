//! Core ledger entities.
//!
//! Records come in unconfirmed/confirmed pairs: the unconfirmed half is an
//! off-chain assertion (submitted via API or gossip) and the confirmed half
//! exists only once the matching on-chain commitment has been observed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::value::MetadataMap;

/// 32-byte content or transaction hash.
pub type Hash32 = [u8; 32];

/// Chain address, hex-encoded with a version prefix.
pub type Address = String;

/// Renders a hash as lowercase hex for logs.
pub fn hash_hex(hash: &Hash32) -> String {
    hex::encode(hash)
}

/// Parses a lowercase hex hash.
pub fn hash_from_hex(s: &str) -> Option<Hash32> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

fn content_hash<T: Serialize>(input: &T) -> Hash32 {
    // bincode over a dedicated hash-input struct is deterministic: struct
    // fields encode in declaration order and MetadataMap is a BTreeMap.
    let bytes = bincode::serialize(input).expect("hash input serialization is infallible");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.finalize().into()
}

// =============================================================================
// Mints
// =============================================================================

/// Off-chain-asserted mint awaiting its on-chain commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconfirmedMint {
    /// Store row id.
    pub id: Uuid,
    /// Content hash over the immutable fields, see [`UnconfirmedMint::content_hash`].
    pub hash: Hash32,
    /// Human-readable title.
    pub title: String,
    /// Total number of fractions this mint issues.
    pub fraction_count: u64,
    /// Free-form description.
    pub description: String,
    /// Search tags.
    pub tags: Vec<String>,
    /// Arbitrary metadata document.
    pub metadata: MetadataMap,
    /// Conditions a buyer has to satisfy.
    pub requirements: MetadataMap,
    /// Lockup / vesting options.
    pub lockup_options: MetadataMap,
    /// Optional external feed URL.
    pub feed_url: Option<String>,
    /// Address that owns the minted supply.
    pub owner_address: Address,
    /// Compressed secp256k1 public key, hex.
    pub public_key: String,
    /// Signature over the content hash, hex.
    pub signature: String,
    /// Unix seconds.
    pub created_at: u64,
    /// Set once the record has been announced to peers.
    pub gossiped: bool,
}

/// The immutable fields a mint hash commits to.
#[derive(Serialize)]
struct MintHashInput<'a> {
    title: &'a str,
    fraction_count: u64,
    description: &'a str,
    tags: &'a [String],
    metadata: &'a MetadataMap,
    requirements: &'a MetadataMap,
    lockup_options: &'a MetadataMap,
    owner_address: &'a str,
    public_key: &'a str,
}

impl UnconfirmedMint {
    /// Deterministic hash of the immutable mint fields.
    ///
    /// The on-chain envelope commits to this value, so any tampering with
    /// the off-chain record breaks the match.
    pub fn content_hash(&self) -> Hash32 {
        content_hash(&MintHashInput {
            title: &self.title,
            fraction_count: self.fraction_count,
            description: &self.description,
            tags: &self.tags,
            metadata: &self.metadata,
            requirements: &self.requirements,
            lockup_options: &self.lockup_options,
            owner_address: &self.owner_address,
            public_key: &self.public_key,
        })
    }
}

/// A mint bound to its on-chain commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mint {
    /// Store row id.
    pub id: Uuid,
    /// Content hash, identical to the unconfirmed record it was promoted from.
    pub hash: Hash32,
    pub title: String,
    pub fraction_count: u64,
    pub description: String,
    pub tags: Vec<String>,
    pub metadata: MetadataMap,
    pub requirements: MetadataMap,
    pub lockup_options: MetadataMap,
    pub feed_url: Option<String>,
    pub owner_address: Address,
    pub public_key: String,
    pub signature: String,
    /// Height of the block carrying the commitment.
    pub block_height: u64,
    /// Hash of the committing chain transaction.
    pub tx_hash: String,
    pub created_at: u64,
    /// Set once the record has been announced to peers.
    pub gossiped: bool,
}

// =============================================================================
// Invoices
// =============================================================================

/// Off-chain-asserted invoice (escrow request) awaiting its commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconfirmedInvoice {
    pub id: Uuid,
    /// Content hash over the immutable fields.
    pub hash: Hash32,
    /// Address the buyer pays into.
    pub payment_address: Address,
    /// Buyer / offerer address.
    pub buyer_address: Address,
    /// Seller whose balance backs the escrow.
    pub seller_address: Address,
    /// Mint being traded.
    pub mint_hash: Hash32,
    /// Fractions requested.
    pub quantity: u64,
    /// Price per fraction, in koinu.
    pub price: u64,
    pub public_key: String,
    pub signature: String,
    pub created_at: u64,
    /// Set once the record has been announced to peers.
    pub gossiped: bool,
}

#[derive(Serialize)]
struct InvoiceHashInput<'a> {
    payment_address: &'a str,
    buyer_address: &'a str,
    seller_address: &'a str,
    mint_hash: &'a Hash32,
    quantity: u64,
    price: u64,
    public_key: &'a str,
}

impl UnconfirmedInvoice {
    /// Deterministic hash of the immutable invoice fields.
    pub fn content_hash(&self) -> Hash32 {
        content_hash(&InvoiceHashInput {
            payment_address: &self.payment_address,
            buyer_address: &self.buyer_address,
            seller_address: &self.seller_address,
            mint_hash: &self.mint_hash,
            quantity: self.quantity,
            price: self.price,
            public_key: &self.public_key,
        })
    }

    /// Total settlement value in koinu. `None` if the product overflows,
    /// which only a hostile record can produce.
    pub fn total_value(&self) -> Option<u64> {
        self.quantity.checked_mul(self.price)
    }
}

/// A confirmed invoice with live escrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub hash: Hash32,
    pub payment_address: Address,
    pub buyer_address: Address,
    pub seller_address: Address,
    pub mint_hash: Hash32,
    pub quantity: u64,
    pub price: u64,
    pub public_key: String,
    pub signature: String,
    pub block_height: u64,
    pub tx_hash: String,
    /// Unix seconds of settlement; `None` while unpaid.
    pub paid_at: Option<u64>,
    pub created_at: u64,
    pub gossiped: bool,
}

impl Invoice {
    /// Total settlement value in koinu. `None` if the product overflows,
    /// which only a hostile record can produce.
    pub fn total_value(&self) -> Option<u64> {
        self.quantity.checked_mul(self.price)
    }
}

// =============================================================================
// Offers
// =============================================================================

/// Standing offer to sell fractions of a mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOffer {
    pub id: Uuid,
    pub hash: Hash32,
    pub mint_hash: Hash32,
    pub offerer_address: Address,
    pub quantity: u64,
    pub price: u64,
    pub public_key: String,
    pub signature: String,
    pub created_at: u64,
    pub gossiped: bool,
}

#[derive(Serialize)]
struct SellOfferHashInput<'a> {
    mint_hash: &'a Hash32,
    offerer_address: &'a str,
    quantity: u64,
    price: u64,
    public_key: &'a str,
}

impl SellOffer {
    /// Deterministic hash of the immutable offer fields.
    pub fn content_hash(&self) -> Hash32 {
        content_hash(&SellOfferHashInput {
            mint_hash: &self.mint_hash,
            offerer_address: &self.offerer_address,
            quantity: self.quantity,
            price: self.price,
            public_key: &self.public_key,
        })
    }
}

/// Standing offer to buy fractions from a specific seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyOffer {
    pub id: Uuid,
    pub hash: Hash32,
    pub mint_hash: Hash32,
    pub offerer_address: Address,
    pub seller_address: Address,
    pub quantity: u64,
    pub price: u64,
    pub public_key: String,
    pub signature: String,
    pub created_at: u64,
    pub gossiped: bool,
}

#[derive(Serialize)]
struct BuyOfferHashInput<'a> {
    mint_hash: &'a Hash32,
    offerer_address: &'a str,
    seller_address: &'a str,
    quantity: u64,
    price: u64,
    public_key: &'a str,
}

impl BuyOffer {
    /// Deterministic hash of the immutable offer fields.
    pub fn content_hash(&self) -> Hash32 {
        content_hash(&BuyOfferHashInput {
            mint_hash: &self.mint_hash,
            offerer_address: &self.offerer_address,
            seller_address: &self.seller_address,
            quantity: self.quantity,
            price: self.price,
            public_key: &self.public_key,
        })
    }
}

// =============================================================================
// Balances and escrow
// =============================================================================

/// One signed balance delta.
///
/// The ledger is append-only: a balance is the sum of all deltas for an
/// `(address, mint_hash)` pair, giving a natural audit trail and trivially
/// idempotent replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub address: Address,
    pub mint_hash: Hash32,
    /// Positive for credits, negative for debits.
    pub delta: i64,
    pub created_at: u64,
}

/// Escrow row: fractions provisionally reserved against a seller's
/// confirmed balance, pending invoice settlement.
///
/// Invariant: `sum(pending for mint, owner) <= confirmed_balance(mint,
/// owner)` at all times, enforced by the reconciliation engine before
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTokenBalance {
    pub invoice_hash: Hash32,
    pub mint_hash: Hash32,
    pub quantity: u64,
    /// Id of the on-chain transaction row that created this escrow.
    pub onchain_tx_id: Uuid,
    pub owner_address: Address,
    pub created_at: u64,
    /// Height of the block that carried the escrowing commitment.
    pub block_height: u64,
}

// =============================================================================
// Chain ingestion
// =============================================================================

/// One transaction output group carrying a recognized protocol envelope.
///
/// Created by the chain ingestion adapter, consumed (deleted) exactly once
/// by the reconciliation engine. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnChainTransaction {
    pub id: Uuid,
    /// Chain transaction hash.
    pub tx_hash: String,
    pub block_height: u64,
    /// Position of the transaction within its block.
    pub tx_number: u32,
    /// Raw protocol action tag.
    pub action_type: u8,
    /// Action payload version carried inside the payload encoding.
    pub action_version: u8,
    /// Still-encoded action payload.
    pub action_data: Vec<u8>,
    /// First pubkeyhash output address: the acting party.
    pub paying_address: Address,
    /// Koinu paid to each output address in this transaction.
    pub output_values: std::collections::BTreeMap<Address, u64>,
}

impl OnChainTransaction {
    /// Total value this transaction paid to `address`.
    pub fn value_to(&self, address: &str) -> u64 {
        self.output_values.get(address).copied().unwrap_or(0)
    }
}

/// Durable ingestion checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainPosition {
    pub block_height: u64,
    pub block_hash: String,
    pub waiting_for_next_hash: bool,
}
