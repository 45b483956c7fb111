//! Escrow and record timeout sweeping.

use std::sync::Arc;

use la_03_ledger_store::LedgerStore;
use shared_types::{hash_hex, TimeSource};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::EngineError;

/// Result of one sweep pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Escrow rows released because their invoice never settled in time.
    pub expired_escrows: usize,
    /// On-chain rows dropped after exhausting their retry window.
    pub dropped_rows: usize,
    /// Unconfirmed mints trimmed after exceeding their off-chain lifetime.
    pub trimmed_mints: usize,
}

/// Releases reserved balances and clears retry backlog that outlived the
/// retention window.
///
/// Without this, a buyer who anchors an invoice and never pays would lock
/// the seller's fractions forever.
pub struct TimeoutSweeper {
    store: Arc<dyn LedgerStore>,
    /// Blocks a row or escrow may await its counterpart.
    retention_window: u64,
    /// Seconds an unconfirmed mint may await its on-chain half.
    mint_ttl_secs: u64,
    time: Arc<dyn TimeSource>,
}

impl TimeoutSweeper {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        retention_window: u64,
        mint_ttl_secs: u64,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            retention_window,
            mint_ttl_secs,
            time,
        }
    }

    /// Sweeps relative to the current ingestion checkpoint.
    pub fn sweep(&self) -> Result<SweepSummary, EngineError> {
        match self.store.chain_position()? {
            Some(position) => self.sweep_at(position.block_height),
            None => Ok(SweepSummary::default()),
        }
    }

    /// Sweeps everything older than `tip_height - retention_window`.
    pub fn sweep_at(&self, tip_height: u64) -> Result<SweepSummary, EngineError> {
        let cutoff = tip_height.saturating_sub(self.retention_window);
        let mut summary = SweepSummary::default();

        for pending in self.store.stale_pending_balances(cutoff)? {
            warn!(
                invoice_hash = %hash_hex(&pending.invoice_hash),
                owner = %pending.owner_address,
                quantity = pending.quantity,
                escrowed_at_height = pending.block_height,
                "releasing expired escrow"
            );
            self.store
                .remove_pending_balance(&pending.invoice_hash, &pending.mint_hash)?;
            self.store.remove_onchain_transaction(pending.onchain_tx_id)?;
            summary.expired_escrows += 1;
        }

        for row in self.store.stale_onchain_transactions(cutoff)? {
            debug!(
                tx_hash = %row.tx_hash,
                height = row.block_height,
                action = row.action_type,
                "dropping on-chain row past its retry window"
            );
            if self.store.remove_onchain_transaction(row.id)? {
                summary.dropped_rows += 1;
            }
        }

        let created_before = self.time.now().saturating_sub(self.mint_ttl_secs);
        summary.trimmed_mints = self.store.trim_unconfirmed_mints_before(created_before)?;

        if summary != SweepSummary::default() {
            info!(
                cutoff,
                expired_escrows = summary.expired_escrows,
                dropped_rows = summary.dropped_rows,
                trimmed_mints = summary.trimmed_mints,
                "sweep complete"
            );
        }
        Ok(summary)
    }

    /// Periodic sweep loop.
    pub async fn run(self, period: std::time::Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("timeout sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep() {
                        warn!(error = %err, "sweep failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received, timeout sweeper stopping");
                    break;
                }
            }
        }
    }
}
