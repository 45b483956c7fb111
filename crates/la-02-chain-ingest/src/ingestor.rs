//! The chain ingestion loop.

use std::sync::Arc;

use la_03_ledger_store::{LedgerStore, NewOnChainTransaction};
use shared_types::ChainPosition;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::IngestError;
use crate::extract::{envelope_from_tx, output_values, paying_address};
use crate::messages::{BlockMessage, ChainMessage, RollbackMessage};

/// Applies follower messages to the ledger store.
///
/// Rows are appended for every recognized envelope in a block before the
/// checkpoint advances, so a crash between the two re-ingests the block
/// rather than losing rows. Row creation is idempotent on transaction
/// hash, which makes that replay harmless.
pub struct ChainIngestor {
    store: Arc<dyn LedgerStore>,
}

impl ChainIngestor {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Drives ingestion until the follower channel closes or shutdown is
    /// signalled.
    pub async fn run(
        self,
        mut messages: mpsc::Receiver<ChainMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("chain ingestor started");
        loop {
            tokio::select! {
                message = messages.recv() => {
                    match message {
                        Some(message) => {
                            if let Err(err) = self.handle_message(&message) {
                                warn!(error = %err, "chain message failed, will retry on redelivery");
                            }
                        }
                        None => {
                            info!("follower channel closed, chain ingestor stopping");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received, chain ingestor stopping");
                    break;
                }
            }
        }
    }

    pub fn handle_message(&self, message: &ChainMessage) -> Result<(), IngestError> {
        match message {
            ChainMessage::Block(block) => {
                self.apply_block(block)?;
                Ok(())
            }
            ChainMessage::Rollback(rollback) => self.apply_rollback(rollback),
        }
    }

    /// Extracts recognized envelopes from a block and advances the
    /// checkpoint. Returns the number of rows appended.
    pub fn apply_block(&self, block: &BlockMessage) -> Result<usize, IngestError> {
        if let Some(position) = self.store.chain_position()? {
            if block.height <= position.block_height {
                debug!(
                    height = block.height,
                    checkpoint = position.block_height,
                    "replayed block at or below checkpoint, skipping"
                );
                return Ok(0);
            }
            if block.height > position.block_height + 1 {
                warn!(
                    height = block.height,
                    checkpoint = position.block_height,
                    "gap in block delivery"
                );
            }
        }

        let mut appended = 0;
        for (tx_number, tx) in block.transactions.iter().enumerate() {
            let Some(envelope) = envelope_from_tx(tx) else {
                continue;
            };
            let Some(payer) = paying_address(tx) else {
                warn!(
                    tx_hash = %tx.tx_hash,
                    "envelope without a pubkeyhash output, skipping"
                );
                continue;
            };
            // Action payloads lead with their version byte.
            let action_version = envelope.payload.first().copied().unwrap_or(0);
            self.store.save_onchain_transaction(NewOnChainTransaction {
                tx_hash: tx.tx_hash.clone(),
                block_height: block.height,
                tx_number: tx_number as u32,
                action_type: envelope.action as u8,
                action_version,
                action_data: envelope.payload,
                paying_address: payer,
                output_values: output_values(tx),
            })?;
            appended += 1;
        }

        self.store.set_chain_position(&ChainPosition {
            block_height: block.height,
            block_hash: block.block_hash.clone(),
            waiting_for_next_hash: false,
        })?;

        if appended > 0 {
            info!(height = block.height, rows = appended, "block ingested");
        } else {
            debug!(height = block.height, "block ingested, no protocol traffic");
        }
        Ok(appended)
    }

    /// Rewinds the checkpoint to the last still-valid block so the
    /// replacement blocks the follower re-delivers pass the replay check.
    /// Reconciled state is never unwound; the notice is logged so
    /// operators can audit the orphaned heights.
    fn apply_rollback(&self, rollback: &RollbackMessage) -> Result<(), IngestError> {
        warn!(
            first_invalid_height = rollback.height,
            block_hash = %rollback.block_hash,
            "chain rollback observed, rewinding checkpoint"
        );
        self.store.set_chain_position(&ChainPosition {
            block_height: rollback.height.saturating_sub(1),
            block_hash: rollback.block_hash.clone(),
            waiting_for_next_hash: true,
        })?;
        Ok(())
    }
}
