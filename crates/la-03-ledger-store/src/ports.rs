//! # Ledger Store Contract
//!
//! The driven port every ledger-touching component depends on. The chain
//! ingestor appends on-chain rows and checkpoints, the reconciliation
//! engine consumes rows and mutates balances, and the gossip publisher
//! drains the outbox.
//!
//! ## Atomicity
//!
//! `promote_mint`, `promote_invoice` and `settle_payment` are compound
//! state transitions. Implementations must apply each as a single atomic
//! unit: either every write in the transition lands or none do. Callers
//! perform all business validation first; these operations only fail on
//! missing prerequisites or backend trouble.

use std::collections::BTreeMap;

use shared_types::{
    Address, BuyOffer, ChainPosition, Hash32, Invoice, Mint, OnChainTransaction,
    PendingTokenBalance, SellOffer, UnconfirmedInvoice, UnconfirmedMint,
};
use uuid::Uuid;

use crate::errors::StoreError;

/// Input for a new on-chain transaction row, before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewOnChainTransaction {
    pub tx_hash: String,
    pub block_height: u64,
    pub tx_number: u32,
    pub action_type: u8,
    pub action_version: u8,
    pub action_data: Vec<u8>,
    pub paying_address: Address,
    pub output_values: BTreeMap<Address, u64>,
}

/// Ledger state store.
///
/// All methods take `&self`; implementations serialize internally. Every
/// mutation visible through this trait is durable once the call returns.
pub trait LedgerStore: Send + Sync {
    // -- ingestion checkpoint ------------------------------------------------

    /// Last durably processed chain position, if any.
    fn chain_position(&self) -> Result<Option<ChainPosition>, StoreError>;

    /// Persists the ingestion checkpoint.
    fn set_chain_position(&self, position: &ChainPosition) -> Result<(), StoreError>;

    // -- on-chain transaction rows -------------------------------------------

    /// Appends a row for a recognized protocol envelope.
    ///
    /// Idempotent on `tx_hash`: re-ingesting a block already seen returns
    /// the existing row id without creating a duplicate.
    fn save_onchain_transaction(&self, row: NewOnChainTransaction) -> Result<Uuid, StoreError>;

    /// Unconsumed rows ordered by `(block_height, tx_number)`, oldest first.
    fn pending_onchain_transactions(
        &self,
        limit: usize,
    ) -> Result<Vec<OnChainTransaction>, StoreError>;

    /// Deletes a consumed (or discarded) row. Returns whether it existed.
    fn remove_onchain_transaction(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Unconsumed rows observed at or below `cutoff_height`, for timeout
    /// sweeps.
    fn stale_onchain_transactions(
        &self,
        cutoff_height: u64,
    ) -> Result<Vec<OnChainTransaction>, StoreError>;

    // -- mints ---------------------------------------------------------------

    /// Stores an off-chain mint assertion. Idempotent on content hash.
    fn save_unconfirmed_mint(&self, mint: UnconfirmedMint) -> Result<(), StoreError>;

    fn unconfirmed_mint_by_hash(&self, hash: &Hash32)
        -> Result<Option<UnconfirmedMint>, StoreError>;

    fn delete_unconfirmed_mint(&self, hash: &Hash32) -> Result<bool, StoreError>;

    /// Deletes unconfirmed mints created before `created_before` that never
    /// saw their on-chain half. Returns how many were removed.
    fn trim_unconfirmed_mints_before(&self, created_before: u64) -> Result<usize, StoreError>;

    fn mint_by_hash(&self, hash: &Hash32) -> Result<Option<Mint>, StoreError>;

    /// Atomic mint promotion: inserts the confirmed [`Mint`], credits the
    /// owner with the full fraction supply, deletes the unconfirmed record
    /// and the consumed on-chain row.
    ///
    /// Fails with [`StoreError::AlreadyConfirmed`] if a mint with this hash
    /// exists, and [`StoreError::NotFound`] if no unconfirmed record does.
    fn promote_mint(&self, hash: &Hash32, row: &OnChainTransaction) -> Result<Mint, StoreError>;

    // -- invoices ------------------------------------------------------------

    /// Stores an off-chain invoice assertion. Idempotent on content hash.
    fn save_unconfirmed_invoice(&self, invoice: UnconfirmedInvoice) -> Result<(), StoreError>;

    fn unconfirmed_invoice_by_hash(
        &self,
        hash: &Hash32,
    ) -> Result<Option<UnconfirmedInvoice>, StoreError>;

    fn invoice_by_hash(&self, hash: &Hash32) -> Result<Option<Invoice>, StoreError>;

    /// Atomic invoice promotion: inserts the confirmed [`Invoice`], deletes
    /// the unconfirmed record and the consumed on-chain row. The escrow row
    /// stays in place until settlement or timeout.
    fn promote_invoice(&self, hash: &Hash32, row: &OnChainTransaction)
        -> Result<Invoice, StoreError>;

    // -- balances and escrow -------------------------------------------------

    /// Confirmed balance: sum of all deltas for `(address, mint_hash)`.
    fn confirmed_balance(&self, address: &str, mint_hash: &Hash32) -> Result<i64, StoreError>;

    /// Total fractions currently escrowed against `owner_address` for a mint.
    fn pending_total(&self, mint_hash: &Hash32, owner_address: &str) -> Result<u64, StoreError>;

    fn pending_balance(
        &self,
        invoice_hash: &Hash32,
        mint_hash: &Hash32,
    ) -> Result<Option<PendingTokenBalance>, StoreError>;

    /// Creates or replaces the escrow row for `(invoice_hash, mint_hash)`.
    fn upsert_pending_balance(&self, pending: PendingTokenBalance) -> Result<(), StoreError>;

    fn remove_pending_balance(
        &self,
        invoice_hash: &Hash32,
        mint_hash: &Hash32,
    ) -> Result<bool, StoreError>;

    /// Escrow rows created at or below `cutoff_height`, for timeout sweeps.
    fn stale_pending_balances(
        &self,
        cutoff_height: u64,
    ) -> Result<Vec<PendingTokenBalance>, StoreError>;

    /// Atomic payment settlement for a confirmed invoice: records
    /// `paid_at`, credits the buyer and debits the seller by the invoice
    /// quantity, removes the escrow row and the consumed on-chain row.
    ///
    /// Fails with [`StoreError::NotFound`] if the invoice is unknown and
    /// [`StoreError::EscrowMissing`] if no escrow row backs it.
    fn settle_payment(
        &self,
        invoice_hash: &Hash32,
        paid_at: u64,
        row_id: Uuid,
    ) -> Result<Invoice, StoreError>;

    // -- offers --------------------------------------------------------------

    /// Stores a sell offer. Idempotent on content hash.
    fn save_sell_offer(&self, offer: SellOffer) -> Result<(), StoreError>;

    fn sell_offer_by_hash(&self, hash: &Hash32) -> Result<Option<SellOffer>, StoreError>;

    fn delete_sell_offer(&self, hash: &Hash32) -> Result<bool, StoreError>;

    /// Stores a buy offer. Idempotent on content hash.
    fn save_buy_offer(&self, offer: BuyOffer) -> Result<(), StoreError>;

    fn buy_offer_by_hash(&self, hash: &Hash32) -> Result<Option<BuyOffer>, StoreError>;

    fn delete_buy_offer(&self, hash: &Hash32) -> Result<bool, StoreError>;

    // -- gossip outbox -------------------------------------------------------

    fn ungossiped_unconfirmed_mints(&self, limit: usize)
        -> Result<Vec<UnconfirmedMint>, StoreError>;

    fn mark_unconfirmed_mint_gossiped(&self, hash: &Hash32) -> Result<(), StoreError>;

    fn ungossiped_mints(&self, limit: usize) -> Result<Vec<Mint>, StoreError>;

    fn mark_mint_gossiped(&self, hash: &Hash32) -> Result<(), StoreError>;

    fn ungossiped_unconfirmed_invoices(
        &self,
        limit: usize,
    ) -> Result<Vec<UnconfirmedInvoice>, StoreError>;

    fn mark_unconfirmed_invoice_gossiped(&self, hash: &Hash32) -> Result<(), StoreError>;

    fn ungossiped_sell_offers(&self, limit: usize) -> Result<Vec<SellOffer>, StoreError>;

    fn mark_sell_offer_gossiped(&self, hash: &Hash32) -> Result<(), StoreError>;

    fn ungossiped_buy_offers(&self, limit: usize) -> Result<Vec<BuyOffer>, StoreError>;

    fn mark_buy_offer_gossiped(&self, hash: &Hash32) -> Result<(), StoreError>;
}
