//! In-memory [`LedgerStore`] adapter.
//!
//! Backs unit and integration tests, and single-node development runs.
//! One mutex guards the whole state, so every trait method (including the
//! compound promotions and settlement) is naturally atomic.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{
    BuyOffer, ChainPosition, Hash32, Invoice, Mint, OnChainTransaction, PendingTokenBalance,
    SellOffer, TimeSource, TokenBalance, UnconfirmedInvoice, UnconfirmedMint,
};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::ports::{LedgerStore, NewOnChainTransaction};

#[derive(Default)]
struct Inner {
    chain_position: Option<ChainPosition>,
    onchain: Vec<OnChainTransaction>,
    unconfirmed_mints: HashMap<Hash32, UnconfirmedMint>,
    mints: HashMap<Hash32, Mint>,
    unconfirmed_invoices: HashMap<Hash32, UnconfirmedInvoice>,
    invoices: HashMap<Hash32, Invoice>,
    sell_offers: HashMap<Hash32, SellOffer>,
    buy_offers: HashMap<Hash32, BuyOffer>,
    balances: Vec<TokenBalance>,
    pendings: HashMap<(Hash32, Hash32), PendingTokenBalance>,
}

/// Mutex-guarded in-memory ledger state.
pub struct InMemoryLedgerStore {
    inner: Mutex<Inner>,
    time: Arc<dyn TimeSource>,
}

impl InMemoryLedgerStore {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            time,
        }
    }

    fn credit(inner: &mut Inner, address: &str, mint_hash: &Hash32, delta: i64, now: u64) {
        inner.balances.push(TokenBalance {
            address: address.to_string(),
            mint_hash: *mint_hash,
            delta,
            created_at: now,
        });
    }

    fn remove_row(inner: &mut Inner, id: Uuid) -> bool {
        let before = inner.onchain.len();
        inner.onchain.retain(|row| row.id != id);
        inner.onchain.len() != before
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn chain_position(&self) -> Result<Option<ChainPosition>, StoreError> {
        Ok(self.inner.lock().chain_position.clone())
    }

    fn set_chain_position(&self, position: &ChainPosition) -> Result<(), StoreError> {
        self.inner.lock().chain_position = Some(position.clone());
        Ok(())
    }

    fn save_onchain_transaction(&self, row: NewOnChainTransaction) -> Result<Uuid, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.onchain.iter().find(|r| r.tx_hash == row.tx_hash) {
            return Ok(existing.id);
        }
        let id = Uuid::new_v4();
        inner.onchain.push(OnChainTransaction {
            id,
            tx_hash: row.tx_hash,
            block_height: row.block_height,
            tx_number: row.tx_number,
            action_type: row.action_type,
            action_version: row.action_version,
            action_data: row.action_data,
            paying_address: row.paying_address,
            output_values: row.output_values,
        });
        Ok(id)
    }

    fn pending_onchain_transactions(
        &self,
        limit: usize,
    ) -> Result<Vec<OnChainTransaction>, StoreError> {
        let inner = self.inner.lock();
        let mut rows = inner.onchain.clone();
        rows.sort_by_key(|row| (row.block_height, row.tx_number));
        rows.truncate(limit);
        Ok(rows)
    }

    fn remove_onchain_transaction(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Self::remove_row(&mut self.inner.lock(), id))
    }

    fn stale_onchain_transactions(
        &self,
        cutoff_height: u64,
    ) -> Result<Vec<OnChainTransaction>, StoreError> {
        let inner = self.inner.lock();
        let mut rows: Vec<_> = inner
            .onchain
            .iter()
            .filter(|row| row.block_height <= cutoff_height)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.block_height, row.tx_number));
        Ok(rows)
    }

    fn save_unconfirmed_mint(&self, mint: UnconfirmedMint) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.mints.contains_key(&mint.hash) {
            return Ok(());
        }
        inner.unconfirmed_mints.entry(mint.hash).or_insert(mint);
        Ok(())
    }

    fn unconfirmed_mint_by_hash(
        &self,
        hash: &Hash32,
    ) -> Result<Option<UnconfirmedMint>, StoreError> {
        Ok(self.inner.lock().unconfirmed_mints.get(hash).cloned())
    }

    fn delete_unconfirmed_mint(&self, hash: &Hash32) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unconfirmed_mints.remove(hash).is_some())
    }

    fn trim_unconfirmed_mints_before(&self, created_before: u64) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let before = inner.unconfirmed_mints.len();
        inner
            .unconfirmed_mints
            .retain(|_, mint| mint.created_at >= created_before);
        Ok(before - inner.unconfirmed_mints.len())
    }

    fn mint_by_hash(&self, hash: &Hash32) -> Result<Option<Mint>, StoreError> {
        Ok(self.inner.lock().mints.get(hash).cloned())
    }

    fn promote_mint(&self, hash: &Hash32, row: &OnChainTransaction) -> Result<Mint, StoreError> {
        let mut inner = self.inner.lock();
        if inner.mints.contains_key(hash) {
            return Err(StoreError::already_confirmed("mint", hash));
        }
        let unconfirmed = inner
            .unconfirmed_mints
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::not_found("unconfirmed mint", hash))?;

        let mint = Mint {
            id: unconfirmed.id,
            hash: unconfirmed.hash,
            title: unconfirmed.title,
            fraction_count: unconfirmed.fraction_count,
            description: unconfirmed.description,
            tags: unconfirmed.tags,
            metadata: unconfirmed.metadata,
            requirements: unconfirmed.requirements,
            lockup_options: unconfirmed.lockup_options,
            feed_url: unconfirmed.feed_url,
            owner_address: unconfirmed.owner_address,
            public_key: unconfirmed.public_key,
            signature: unconfirmed.signature,
            block_height: row.block_height,
            tx_hash: row.tx_hash.clone(),
            created_at: unconfirmed.created_at,
            gossiped: false,
        };

        let now = self.time.now();
        Self::credit(&mut inner, &mint.owner_address, hash, mint.fraction_count as i64, now);
        inner.mints.insert(*hash, mint.clone());
        inner.unconfirmed_mints.remove(hash);
        Self::remove_row(&mut inner, row.id);
        Ok(mint)
    }

    fn save_unconfirmed_invoice(&self, invoice: UnconfirmedInvoice) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.invoices.contains_key(&invoice.hash) {
            return Ok(());
        }
        inner
            .unconfirmed_invoices
            .entry(invoice.hash)
            .or_insert(invoice);
        Ok(())
    }

    fn unconfirmed_invoice_by_hash(
        &self,
        hash: &Hash32,
    ) -> Result<Option<UnconfirmedInvoice>, StoreError> {
        Ok(self.inner.lock().unconfirmed_invoices.get(hash).cloned())
    }

    fn invoice_by_hash(&self, hash: &Hash32) -> Result<Option<Invoice>, StoreError> {
        Ok(self.inner.lock().invoices.get(hash).cloned())
    }

    fn promote_invoice(
        &self,
        hash: &Hash32,
        row: &OnChainTransaction,
    ) -> Result<Invoice, StoreError> {
        let mut inner = self.inner.lock();
        if inner.invoices.contains_key(hash) {
            return Err(StoreError::already_confirmed("invoice", hash));
        }
        let unconfirmed = inner
            .unconfirmed_invoices
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::not_found("unconfirmed invoice", hash))?;

        let invoice = Invoice {
            id: unconfirmed.id,
            hash: unconfirmed.hash,
            payment_address: unconfirmed.payment_address,
            buyer_address: unconfirmed.buyer_address,
            seller_address: unconfirmed.seller_address,
            mint_hash: unconfirmed.mint_hash,
            quantity: unconfirmed.quantity,
            price: unconfirmed.price,
            public_key: unconfirmed.public_key,
            signature: unconfirmed.signature,
            block_height: row.block_height,
            tx_hash: row.tx_hash.clone(),
            paid_at: None,
            created_at: unconfirmed.created_at,
            gossiped: false,
        };

        inner.invoices.insert(*hash, invoice.clone());
        inner.unconfirmed_invoices.remove(hash);
        Self::remove_row(&mut inner, row.id);
        Ok(invoice)
    }

    fn confirmed_balance(&self, address: &str, mint_hash: &Hash32) -> Result<i64, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .balances
            .iter()
            .filter(|b| b.address == address && b.mint_hash == *mint_hash)
            .map(|b| b.delta)
            .sum())
    }

    fn pending_total(&self, mint_hash: &Hash32, owner_address: &str) -> Result<u64, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .pendings
            .values()
            .filter(|p| p.mint_hash == *mint_hash && p.owner_address == owner_address)
            .map(|p| p.quantity)
            .sum())
    }

    fn pending_balance(
        &self,
        invoice_hash: &Hash32,
        mint_hash: &Hash32,
    ) -> Result<Option<PendingTokenBalance>, StoreError> {
        Ok(self
            .inner
            .lock()
            .pendings
            .get(&(*invoice_hash, *mint_hash))
            .cloned())
    }

    fn upsert_pending_balance(&self, pending: PendingTokenBalance) -> Result<(), StoreError> {
        self.inner
            .lock()
            .pendings
            .insert((pending.invoice_hash, pending.mint_hash), pending);
        Ok(())
    }

    fn remove_pending_balance(
        &self,
        invoice_hash: &Hash32,
        mint_hash: &Hash32,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .pendings
            .remove(&(*invoice_hash, *mint_hash))
            .is_some())
    }

    fn stale_pending_balances(
        &self,
        cutoff_height: u64,
    ) -> Result<Vec<PendingTokenBalance>, StoreError> {
        let inner = self.inner.lock();
        let mut stale: Vec<_> = inner
            .pendings
            .values()
            .filter(|p| p.block_height <= cutoff_height)
            .cloned()
            .collect();
        stale.sort_by_key(|p| (p.block_height, p.invoice_hash));
        Ok(stale)
    }

    fn settle_payment(
        &self,
        invoice_hash: &Hash32,
        paid_at: u64,
        row_id: Uuid,
    ) -> Result<Invoice, StoreError> {
        let mut inner = self.inner.lock();
        let mut invoice = inner
            .invoices
            .get(invoice_hash)
            .cloned()
            .ok_or_else(|| StoreError::not_found("invoice", invoice_hash))?;
        let key = (*invoice_hash, invoice.mint_hash);
        if !inner.pendings.contains_key(&key) {
            return Err(StoreError::EscrowMissing {
                invoice_hash: shared_types::hash_hex(invoice_hash),
            });
        }

        invoice.paid_at = Some(paid_at);
        let quantity = invoice.quantity as i64;
        let mint_hash = invoice.mint_hash;
        let buyer = invoice.buyer_address.clone();
        let seller = invoice.seller_address.clone();

        let now = self.time.now();
        Self::credit(&mut inner, &buyer, &mint_hash, quantity, now);
        Self::credit(&mut inner, &seller, &mint_hash, -quantity, now);
        inner.pendings.remove(&key);
        inner.invoices.insert(*invoice_hash, invoice.clone());
        Self::remove_row(&mut inner, row_id);
        Ok(invoice)
    }

    fn save_sell_offer(&self, offer: SellOffer) -> Result<(), StoreError> {
        self.inner
            .lock()
            .sell_offers
            .entry(offer.hash)
            .or_insert(offer);
        Ok(())
    }

    fn sell_offer_by_hash(&self, hash: &Hash32) -> Result<Option<SellOffer>, StoreError> {
        Ok(self.inner.lock().sell_offers.get(hash).cloned())
    }

    fn delete_sell_offer(&self, hash: &Hash32) -> Result<bool, StoreError> {
        Ok(self.inner.lock().sell_offers.remove(hash).is_some())
    }

    fn save_buy_offer(&self, offer: BuyOffer) -> Result<(), StoreError> {
        self.inner
            .lock()
            .buy_offers
            .entry(offer.hash)
            .or_insert(offer);
        Ok(())
    }

    fn buy_offer_by_hash(&self, hash: &Hash32) -> Result<Option<BuyOffer>, StoreError> {
        Ok(self.inner.lock().buy_offers.get(hash).cloned())
    }

    fn delete_buy_offer(&self, hash: &Hash32) -> Result<bool, StoreError> {
        Ok(self.inner.lock().buy_offers.remove(hash).is_some())
    }

    fn ungossiped_unconfirmed_mints(
        &self,
        limit: usize,
    ) -> Result<Vec<UnconfirmedMint>, StoreError> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner
            .unconfirmed_mints
            .values()
            .filter(|m| !m.gossiped)
            .cloned()
            .collect();
        out.sort_by_key(|m| (m.created_at, m.hash));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_unconfirmed_mint_gossiped(&self, hash: &Hash32) -> Result<(), StoreError> {
        if let Some(mint) = self.inner.lock().unconfirmed_mints.get_mut(hash) {
            mint.gossiped = true;
        }
        Ok(())
    }

    fn ungossiped_mints(&self, limit: usize) -> Result<Vec<Mint>, StoreError> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner.mints.values().filter(|m| !m.gossiped).cloned().collect();
        out.sort_by_key(|m| (m.block_height, m.hash));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_mint_gossiped(&self, hash: &Hash32) -> Result<(), StoreError> {
        if let Some(mint) = self.inner.lock().mints.get_mut(hash) {
            mint.gossiped = true;
        }
        Ok(())
    }

    fn ungossiped_unconfirmed_invoices(
        &self,
        limit: usize,
    ) -> Result<Vec<UnconfirmedInvoice>, StoreError> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner
            .unconfirmed_invoices
            .values()
            .filter(|i| !i.gossiped)
            .cloned()
            .collect();
        out.sort_by_key(|i| (i.created_at, i.hash));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_unconfirmed_invoice_gossiped(&self, hash: &Hash32) -> Result<(), StoreError> {
        if let Some(invoice) = self.inner.lock().unconfirmed_invoices.get_mut(hash) {
            invoice.gossiped = true;
        }
        Ok(())
    }

    fn ungossiped_sell_offers(&self, limit: usize) -> Result<Vec<SellOffer>, StoreError> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner
            .sell_offers
            .values()
            .filter(|o| !o.gossiped)
            .cloned()
            .collect();
        out.sort_by_key(|o| (o.created_at, o.hash));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_sell_offer_gossiped(&self, hash: &Hash32) -> Result<(), StoreError> {
        if let Some(offer) = self.inner.lock().sell_offers.get_mut(hash) {
            offer.gossiped = true;
        }
        Ok(())
    }

    fn ungossiped_buy_offers(&self, limit: usize) -> Result<Vec<BuyOffer>, StoreError> {
        let inner = self.inner.lock();
        let mut out: Vec<_> = inner
            .buy_offers
            .values()
            .filter(|o| !o.gossiped)
            .cloned()
            .collect();
        out.sort_by_key(|o| (o.created_at, o.hash));
        out.truncate(limit);
        Ok(out)
    }

    fn mark_buy_offer_gossiped(&self, hash: &Hash32) -> Result<(), StoreError> {
        if let Some(offer) = self.inner.lock().buy_offers.get_mut(hash) {
            offer.gossiped = true;
        }
        Ok(())
    }
}
