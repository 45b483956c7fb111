//! Mint matching.

use std::sync::Arc;

use la_01_protocol::OnChainMintMessage;
use la_03_ledger_store::{LedgerStore, StoreError};
use shared_types::{hash_hex, OnChainTransaction};
use tracing::{debug, info};

use crate::engine::RowOutcome;
use crate::errors::EngineError;

/// Matches on-chain mint commitments against off-chain mint assertions.
///
/// The off-chain half may arrive late via gossip, so an unmatched row is
/// left in place and re-polled: a deliberate at-least-once retry.
pub struct MintMatcher {
    store: Arc<dyn LedgerStore>,
}

impl MintMatcher {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn process(&self, row: &OnChainTransaction) -> Result<RowOutcome, EngineError> {
        let message = OnChainMintMessage::decode(&row.action_data)?;
        let mint_hash = message.mint_hash;

        if self.store.mint_by_hash(&mint_hash)?.is_some() {
            debug!(mint_hash = %hash_hex(&mint_hash), "mint already confirmed, consuming redelivered row");
            return Ok(RowOutcome::Discard);
        }

        if self.store.unconfirmed_mint_by_hash(&mint_hash)?.is_none() {
            debug!(
                mint_hash = %hash_hex(&mint_hash),
                tx_hash = %row.tx_hash,
                "off-chain mint not yet seen, leaving row for retry"
            );
            return Ok(RowOutcome::Retry);
        }

        match self.store.promote_mint(&mint_hash, row) {
            Ok(mint) => {
                info!(
                    mint_hash = %hash_hex(&mint_hash),
                    owner = %mint.owner_address,
                    fractions = mint.fraction_count,
                    height = row.block_height,
                    "mint confirmed"
                );
                Ok(RowOutcome::Consumed)
            }
            // Lost a race against another promotion of the same hash.
            Err(StoreError::AlreadyConfirmed { .. }) => Ok(RowOutcome::Discard),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{confirm, mint_row, sample_mint, store_with_time};

    #[test]
    fn test_unmatched_mint_row_is_retried() {
        let store = store_with_time();
        let matcher = MintMatcher::new(store.clone());
        let row = confirm(&store, mint_row("aa", 5, [1u8; 32]));

        assert!(matches!(matcher.process(&row).unwrap(), RowOutcome::Retry));
        assert_eq!(store.pending_onchain_transactions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_matched_mint_is_promoted_once() {
        let store = store_with_time();
        let matcher = MintMatcher::new(store.clone());
        let mint = sample_mint([1u8; 32], "Aowner", 100);
        store.save_unconfirmed_mint(mint).unwrap();
        let row = confirm(&store, mint_row("aa", 5, [1u8; 32]));

        assert!(matches!(matcher.process(&row).unwrap(), RowOutcome::Consumed));
        assert_eq!(store.confirmed_balance("Aowner", &[1u8; 32]).unwrap(), 100);
        assert!(store.pending_onchain_transactions(10).unwrap().is_empty());

        // Redelivered row for an already-confirmed mint is just dropped.
        assert!(matches!(matcher.process(&row).unwrap(), RowOutcome::Discard));
        assert_eq!(store.confirmed_balance("Aowner", &[1u8; 32]).unwrap(), 100);
    }

    #[test]
    fn test_garbage_payload_is_terminal() {
        let store = store_with_time();
        let matcher = MintMatcher::new(store.clone());
        let mut row = confirm(&store, mint_row("aa", 5, [1u8; 32]));
        row.action_data = vec![0xFF, 0xFF];

        let err = matcher.process(&row).unwrap_err();
        assert!(err.is_terminal());
    }
}
