//! Shared fixtures for integration tests.

use std::sync::Arc;

use la_01_protocol::{invoice_envelope, mint_envelope, op_return_script, payment_envelope, MessageEnvelope};
use la_02_chain_ingest::{
    BlockMessage, ChainIngestor, RawTransaction, TxOutput, SCRIPT_TYPE_NULLDATA,
    SCRIPT_TYPE_PUBKEYHASH,
};
use la_03_ledger_store::InMemoryLedgerStore;
use la_04_reconciliation::{ReconcileEngine, TimeoutSweeper};
use shared_crypto::Keypair;
use shared_types::{Hash32, MockTimeSource, UnconfirmedInvoice, UnconfirmedMint};
use uuid::Uuid;

pub const TEST_EPOCH: u64 = 1_700_000_000;

/// One store with the loops that feed and drain it, on a mock clock.
pub struct TestNode {
    pub store: Arc<InMemoryLedgerStore>,
    pub ingestor: ChainIngestor,
    pub engine: ReconcileEngine,
    pub sweeper: TimeoutSweeper,
    pub time: Arc<MockTimeSource>,
}

impl TestNode {
    pub fn new() -> Self {
        let time = Arc::new(MockTimeSource::new(TEST_EPOCH));
        let store = Arc::new(InMemoryLedgerStore::new(time.clone()));
        Self {
            ingestor: ChainIngestor::new(store.clone()),
            engine: ReconcileEngine::new(store.clone(), time.clone(), 100),
            sweeper: TimeoutSweeper::new(store.clone(), 100, 86_400, time.clone()),
            store,
            time,
        }
    }

    /// Ingests a block and runs reconciliation ticks until the backlog
    /// stops shrinking.
    pub fn ingest_and_reconcile(&self, block: &BlockMessage) {
        self.ingestor.apply_block(block).unwrap();
        loop {
            let summary = self.engine.tick().unwrap();
            if summary.consumed == 0 && summary.discarded == 0 {
                break;
            }
        }
    }
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A keypair with record-building helpers; every record is properly
/// hashed and signed.
pub struct Actor {
    keypair: Keypair,
}

impl Actor {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    pub fn address(&self) -> String {
        self.keypair.address()
    }

    /// Hex signature over `message` with this actor's key.
    pub fn sign(&self, message: &[u8]) -> String {
        self.keypair.sign(message).to_hex()
    }

    pub fn mint(&self, title: &str, fraction_count: u64) -> UnconfirmedMint {
        let mut mint = UnconfirmedMint {
            id: Uuid::new_v4(),
            hash: [0u8; 32],
            title: title.to_string(),
            fraction_count,
            description: format!("{title} fractions"),
            tags: vec!["test".into()],
            metadata: Default::default(),
            requirements: Default::default(),
            lockup_options: Default::default(),
            feed_url: None,
            owner_address: self.address(),
            public_key: self.keypair.public_key().to_hex(),
            signature: String::new(),
            created_at: TEST_EPOCH,
            gossiped: false,
        };
        mint.hash = mint.content_hash();
        mint.signature = self.keypair.sign(&mint.hash).to_hex();
        mint
    }

    /// Invoice sold by this actor to `buyer`.
    pub fn invoice(
        &self,
        buyer: &Actor,
        mint_hash: Hash32,
        quantity: u64,
        price: u64,
    ) -> UnconfirmedInvoice {
        let mut invoice = UnconfirmedInvoice {
            id: Uuid::new_v4(),
            hash: [0u8; 32],
            payment_address: self.address(),
            buyer_address: buyer.address(),
            seller_address: self.address(),
            mint_hash,
            quantity,
            price,
            public_key: self.keypair.public_key().to_hex(),
            signature: String::new(),
            created_at: TEST_EPOCH,
            gossiped: false,
        };
        invoice.hash = invoice.content_hash();
        invoice.signature = self.keypair.sign(&invoice.hash).to_hex();
        invoice
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn block(height: u64, transactions: Vec<RawTransaction>) -> BlockMessage {
    BlockMessage {
        height,
        block_hash: format!("block-{height}"),
        transactions,
    }
}

pub fn data_output(envelope: &MessageEnvelope) -> TxOutput {
    TxOutput {
        script_type: SCRIPT_TYPE_NULLDATA.into(),
        addresses: vec![],
        value: 0,
        script: op_return_script(&envelope.encode()),
    }
}

pub fn pay_output(address: &str, value: u64) -> TxOutput {
    TxOutput {
        script_type: SCRIPT_TYPE_PUBKEYHASH.into(),
        addresses: vec![address.to_string()],
        value,
        script: vec![0x76, 0xA9],
    }
}

/// Chain transaction anchoring a mint, paid by the minter.
pub fn mint_tx(tx_hash: &str, mint: &UnconfirmedMint) -> RawTransaction {
    RawTransaction {
        tx_hash: tx_hash.to_string(),
        outputs: vec![
            data_output(&mint_envelope(mint.hash)),
            pay_output(&mint.owner_address, 100_000),
        ],
    }
}

/// Chain transaction anchoring an invoice, paid by the seller.
pub fn invoice_tx(tx_hash: &str, invoice: &UnconfirmedInvoice) -> RawTransaction {
    RawTransaction {
        tx_hash: tx_hash.to_string(),
        outputs: vec![
            data_output(&invoice_envelope(
                invoice.hash,
                invoice.mint_hash,
                &invoice.seller_address,
                invoice.quantity,
            )),
            pay_output(&invoice.seller_address, 100_000),
        ],
    }
}

/// Chain transaction settling an invoice: pays `value` to the seller.
pub fn payment_tx(tx_hash: &str, invoice: &UnconfirmedInvoice, value: u64) -> RawTransaction {
    RawTransaction {
        tx_hash: tx_hash.to_string(),
        outputs: vec![
            data_output(&payment_envelope(invoice.hash)),
            pay_output(&invoice.seller_address, value),
            pay_output(&invoice.buyer_address, 5_000),
        ],
    }
}
