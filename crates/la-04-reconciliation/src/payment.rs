//! Payment settlement.

use std::sync::Arc;

use la_01_protocol::OnChainPaymentMessage;
use la_03_ledger_store::LedgerStore;
use shared_types::{hash_hex, OnChainTransaction, TimeSource};
use tracing::{debug, info};

use crate::engine::RowOutcome;
use crate::errors::EngineError;

/// Settles confirmed invoices against observed payment transactions.
///
/// The only operation that moves value between parties, and the most
/// failure-sensitive path: the whole transition happens in one atomic
/// store call.
pub struct PaymentProcessor {
    store: Arc<dyn LedgerStore>,
    time: Arc<dyn TimeSource>,
}

impl PaymentProcessor {
    pub fn new(store: Arc<dyn LedgerStore>, time: Arc<dyn TimeSource>) -> Self {
        Self { store, time }
    }

    pub fn process(&self, row: &OnChainTransaction) -> Result<RowOutcome, EngineError> {
        let message = OnChainPaymentMessage::decode(&row.action_data)?;
        let invoice_hash = message.invoice_hash;

        let Some(invoice) = self.store.invoice_by_hash(&invoice_hash)? else {
            return Err(EngineError::InvoiceNotFound {
                invoice_hash: hash_hex(&invoice_hash),
            });
        };

        if invoice.paid_at.is_some() {
            debug!(
                invoice_hash = %hash_hex(&invoice_hash),
                "invoice already settled, consuming redelivered row"
            );
            return Ok(RowOutcome::Discard);
        }

        // quantity and price are peer-supplied, so the product can be
        // driven past u64 by a hostile record.
        let Some(expected) = invoice.total_value() else {
            return Err(EngineError::ValueOverflow {
                invoice_hash: hash_hex(&invoice_hash),
                quantity: invoice.quantity,
                price: invoice.price,
            });
        };
        let paid = row.value_to(&invoice.seller_address);
        if paid != expected {
            return Err(EngineError::ValueMismatch {
                invoice_hash: hash_hex(&invoice_hash),
                expected,
                paid,
            });
        }

        let Some(pending) = self.store.pending_balance(&invoice_hash, &invoice.mint_hash)? else {
            return Err(EngineError::EscrowMismatch {
                invoice_hash: hash_hex(&invoice_hash),
                pending: 0,
                expected: invoice.quantity,
            });
        };
        if pending.quantity != invoice.quantity {
            return Err(EngineError::EscrowMismatch {
                invoice_hash: hash_hex(&invoice_hash),
                pending: pending.quantity,
                expected: invoice.quantity,
            });
        }

        let settled = self
            .store
            .settle_payment(&invoice_hash, self.time.now(), row.id)?;
        info!(
            invoice_hash = %hash_hex(&invoice_hash),
            buyer = %settled.buyer_address,
            seller = %settled.seller_address,
            quantity = settled.quantity,
            value = paid,
            "payment settled"
        );
        Ok(RowOutcome::Consumed)
    }
}
