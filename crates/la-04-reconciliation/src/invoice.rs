//! Invoice escrow and promotion.

use std::sync::Arc;

use la_01_protocol::OnChainInvoiceMessage;
use la_03_ledger_store::{LedgerStore, StoreError};
use shared_types::{hash_hex, OnChainTransaction, PendingTokenBalance, TimeSource};
use tracing::{debug, info, warn};

use crate::engine::RowOutcome;
use crate::errors::EngineError;

/// Handles on-chain invoice commitments: escrow reservation first, then
/// promotion of the off-chain invoice record.
///
/// Escrow is one-shot consume-or-discard, unlike mint matching: the
/// decision depends on balance state that only gets worse by waiting, so
/// an underfunded request fails fast instead of holding the row hostage.
pub struct InvoiceProcessor {
    store: Arc<dyn LedgerStore>,
    time: Arc<dyn TimeSource>,
}

impl InvoiceProcessor {
    pub fn new(store: Arc<dyn LedgerStore>, time: Arc<dyn TimeSource>) -> Self {
        Self { store, time }
    }

    pub fn process(&self, row: &OnChainTransaction) -> Result<RowOutcome, EngineError> {
        let message = OnChainInvoiceMessage::decode(&row.action_data)?;

        if self.store.invoice_by_hash(&message.invoice_hash)?.is_some() {
            debug!(
                invoice_hash = %hash_hex(&message.invoice_hash),
                "invoice already confirmed, consuming redelivered row"
            );
            return Ok(RowOutcome::Discard);
        }

        if !self.ensure_pending_balance(&message, row)? {
            return Ok(RowOutcome::Discard);
        }
        self.try_promote(&message, row)
    }

    /// Reserves escrow against the seller's confirmed balance. Returns
    /// `false` when the request exceeds available funds, which permanently
    /// rejects this on-chain assertion.
    fn ensure_pending_balance(
        &self,
        message: &OnChainInvoiceMessage,
        row: &OnChainTransaction,
    ) -> Result<bool, EngineError> {
        if self
            .store
            .pending_balance(&message.invoice_hash, &message.mint_hash)?
            .is_some()
        {
            return Ok(true);
        }

        let confirmed = self
            .store
            .confirmed_balance(&message.seller_address, &message.mint_hash)?;
        let pending = self
            .store
            .pending_total(&message.mint_hash, &message.seller_address)?;
        let available = confirmed - pending as i64;

        if available < message.quantity as i64 {
            warn!(
                invoice_hash = %hash_hex(&message.invoice_hash),
                seller = %message.seller_address,
                requested = message.quantity,
                available,
                "insufficient balance for escrow, discarding invoice commitment"
            );
            return Ok(false);
        }

        self.store.upsert_pending_balance(PendingTokenBalance {
            invoice_hash: message.invoice_hash,
            mint_hash: message.mint_hash,
            quantity: message.quantity,
            onchain_tx_id: row.id,
            owner_address: message.seller_address.clone(),
            created_at: self.time.now(),
            block_height: row.block_height,
        })?;
        info!(
            invoice_hash = %hash_hex(&message.invoice_hash),
            seller = %message.seller_address,
            quantity = message.quantity,
            "escrow reserved"
        );
        Ok(true)
    }

    fn try_promote(
        &self,
        message: &OnChainInvoiceMessage,
        row: &OnChainTransaction,
    ) -> Result<RowOutcome, EngineError> {
        let Some(unconfirmed) = self
            .store
            .unconfirmed_invoice_by_hash(&message.invoice_hash)?
        else {
            debug!(
                invoice_hash = %hash_hex(&message.invoice_hash),
                "off-chain invoice not yet seen, leaving row for retry"
            );
            return Ok(RowOutcome::Retry);
        };

        if message.quantity < unconfirmed.quantity {
            warn!(
                invoice_hash = %hash_hex(&message.invoice_hash),
                escrowed = message.quantity,
                requested = unconfirmed.quantity,
                "escrow smaller than invoice quantity, leaving both for retry"
            );
            return Ok(RowOutcome::Retry);
        }

        match self.store.promote_invoice(&message.invoice_hash, row) {
            Ok(invoice) => {
                info!(
                    invoice_hash = %hash_hex(&invoice.hash),
                    buyer = %invoice.buyer_address,
                    seller = %invoice.seller_address,
                    height = row.block_height,
                    "invoice confirmed"
                );
                Ok(RowOutcome::Consumed)
            }
            Err(StoreError::AlreadyConfirmed { .. }) => Ok(RowOutcome::Discard),
            Err(err) => Err(err.into()),
        }
    }
}
