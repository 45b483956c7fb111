//! The reconciliation loop.

use std::sync::Arc;
use std::time::Duration;

use la_01_protocol::ActionType;
use la_03_ledger_store::LedgerStore;
use shared_types::{OnChainTransaction, TimeSource};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::invoice::InvoiceProcessor;
use crate::mint::MintMatcher;
use crate::payment::PaymentProcessor;

/// What happened to one on-chain row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row was deleted as part of a completed state transition.
    Consumed,
    /// The row stays for the next poll.
    Retry,
    /// The row is dropped without a state transition.
    Discard,
}

/// Counters for one engine tick.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub processed: usize,
    pub consumed: usize,
    pub retried: usize,
    pub discarded: usize,
}

/// Drains on-chain rows in chain order and dispatches them by action.
///
/// One poisoned row never aborts the batch: terminal failures burn that
/// row, everything else leaves it for the next tick.
pub struct ReconcileEngine {
    store: Arc<dyn LedgerStore>,
    mints: MintMatcher,
    invoices: InvoiceProcessor,
    payments: PaymentProcessor,
    batch_size: usize,
}

impl ReconcileEngine {
    pub fn new(store: Arc<dyn LedgerStore>, time: Arc<dyn TimeSource>, batch_size: usize) -> Self {
        Self {
            mints: MintMatcher::new(store.clone()),
            invoices: InvoiceProcessor::new(store.clone(), time.clone()),
            payments: PaymentProcessor::new(store.clone(), time),
            store,
            batch_size,
        }
    }

    /// One bounded reconciliation pass.
    pub fn tick(&self) -> Result<TickSummary, EngineError> {
        let rows = self.store.pending_onchain_transactions(self.batch_size)?;
        let mut summary = TickSummary::default();

        for row in rows {
            summary.processed += 1;
            match self.process_row(&row) {
                Ok(RowOutcome::Consumed) => summary.consumed += 1,
                Ok(RowOutcome::Retry) => summary.retried += 1,
                Ok(RowOutcome::Discard) => {
                    self.discard(&row, &mut summary);
                }
                Err(err) if err.is_terminal() => {
                    warn!(
                        tx_hash = %row.tx_hash,
                        height = row.block_height,
                        error = %err,
                        "terminal failure, discarding row"
                    );
                    self.discard(&row, &mut summary);
                }
                Err(err) => {
                    warn!(
                        tx_hash = %row.tx_hash,
                        height = row.block_height,
                        error = %err,
                        "row failed, leaving for retry"
                    );
                    summary.retried += 1;
                }
            }
        }
        Ok(summary)
    }

    fn process_row(&self, row: &OnChainTransaction) -> Result<RowOutcome, EngineError> {
        match ActionType::try_from(row.action_type) {
            Ok(ActionType::Mint) => self.mints.process(row),
            Ok(ActionType::Invoice) => self.invoices.process(row),
            Ok(ActionType::Payment) => self.payments.process(row),
            // Offers live purely off-chain; an anchored one is noise.
            Ok(ActionType::SellOffer) | Ok(ActionType::BuyOffer) | Err(_) => {
                Err(EngineError::UnknownAction {
                    action: row.action_type,
                })
            }
        }
    }

    fn discard(&self, row: &OnChainTransaction, summary: &mut TickSummary) {
        match self.store.remove_onchain_transaction(row.id) {
            Ok(_) => summary.discarded += 1,
            Err(err) => {
                warn!(tx_hash = %row.tx_hash, error = %err, "failed to discard row");
                summary.retried += 1;
            }
        }
    }

    /// Periodic reconciliation loop.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("reconciliation engine started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick() {
                        Ok(summary) if summary.processed > 0 => {
                            info!(
                                processed = summary.processed,
                                consumed = summary.consumed,
                                retried = summary.retried,
                                discarded = summary.discarded,
                                "reconciliation tick"
                            );
                        }
                        Ok(_) => {}
                        Err(err) => warn!(error = %err, "reconciliation tick failed"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received, reconciliation engine stopping");
                    break;
                }
            }
        }
    }
}
