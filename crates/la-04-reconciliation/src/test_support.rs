//! Shared fixtures for the engine unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use la_01_protocol::{invoice_envelope, mint_envelope, payment_envelope, ActionType};
use la_03_ledger_store::{InMemoryLedgerStore, LedgerStore, NewOnChainTransaction};
use shared_types::{Hash32, MockTimeSource, OnChainTransaction, UnconfirmedInvoice, UnconfirmedMint};
use uuid::Uuid;

pub const TEST_EPOCH: u64 = 1_700_000_000;

pub fn store_with_time() -> Arc<InMemoryLedgerStore> {
    Arc::new(InMemoryLedgerStore::new(Arc::new(MockTimeSource::new(TEST_EPOCH))))
}

pub fn sample_mint(hash: Hash32, owner: &str, fraction_count: u64) -> UnconfirmedMint {
    UnconfirmedMint {
        id: Uuid::new_v4(),
        hash,
        title: "Granary".into(),
        fraction_count,
        description: String::new(),
        tags: vec![],
        metadata: Default::default(),
        requirements: Default::default(),
        lockup_options: Default::default(),
        feed_url: None,
        owner_address: owner.into(),
        public_key: "02aa".into(),
        signature: "bb".into(),
        created_at: TEST_EPOCH,
        gossiped: false,
    }
}

pub fn sample_invoice(
    hash: Hash32,
    mint_hash: Hash32,
    seller: &str,
    buyer: &str,
    quantity: u64,
    price: u64,
) -> UnconfirmedInvoice {
    UnconfirmedInvoice {
        id: Uuid::new_v4(),
        hash,
        payment_address: seller.into(),
        buyer_address: buyer.into(),
        seller_address: seller.into(),
        mint_hash,
        quantity,
        price,
        public_key: "02aa".into(),
        signature: "bb".into(),
        created_at: TEST_EPOCH,
        gossiped: false,
    }
}

pub fn mint_row(tx_hash: &str, height: u64, mint_hash: Hash32) -> NewOnChainTransaction {
    row(tx_hash, height, ActionType::Mint, mint_envelope(mint_hash).payload, BTreeMap::new())
}

pub fn invoice_row(
    tx_hash: &str,
    height: u64,
    invoice_hash: Hash32,
    mint_hash: Hash32,
    seller: &str,
    quantity: u64,
) -> NewOnChainTransaction {
    row(
        tx_hash,
        height,
        ActionType::Invoice,
        invoice_envelope(invoice_hash, mint_hash, seller, quantity).payload,
        BTreeMap::new(),
    )
}

pub fn payment_row(
    tx_hash: &str,
    height: u64,
    invoice_hash: Hash32,
    paid_to: &str,
    value: u64,
) -> NewOnChainTransaction {
    let mut outputs = BTreeMap::new();
    outputs.insert(paid_to.to_string(), value);
    row(tx_hash, height, ActionType::Payment, payment_envelope(invoice_hash).payload, outputs)
}

fn row(
    tx_hash: &str,
    height: u64,
    action: ActionType,
    payload: Vec<u8>,
    output_values: BTreeMap<String, u64>,
) -> NewOnChainTransaction {
    NewOnChainTransaction {
        tx_hash: tx_hash.to_string(),
        block_height: height,
        tx_number: 0,
        action_type: action as u8,
        action_version: payload.first().copied().unwrap_or(0),
        action_data: payload,
        paying_address: "Apayer".into(),
        output_values,
    }
}

/// Saves the row and returns the stored copy with its assigned id.
pub fn confirm(store: &Arc<InMemoryLedgerStore>, row: NewOnChainTransaction) -> OnChainTransaction {
    let tx_hash = row.tx_hash.clone();
    store.save_onchain_transaction(row).unwrap();
    store
        .pending_onchain_transactions(usize::MAX)
        .unwrap()
        .into_iter()
        .find(|r| r.tx_hash == tx_hash)
        .expect("row just saved")
}
