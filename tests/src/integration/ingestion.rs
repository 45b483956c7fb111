//! Chain ingestion against the ledger store.

#[cfg(test)]
mod tests {
    use crate::support::{block, data_output, mint_tx, pay_output, Actor, TestNode};
    use la_01_protocol::{mint_envelope, payment_envelope, ActionType};
    use la_02_chain_ingest::RawTransaction;
    use la_03_ledger_store::LedgerStore;

    #[test]
    fn test_block_to_rows_to_checkpoint() {
        let node = TestNode::new();
        let minter = Actor::new();
        let mint = minter.mint("Warehouse", 100);

        let appended = node
            .ingestor
            .apply_block(&block(12, vec![mint_tx("aa", &mint)]))
            .unwrap();
        assert_eq!(appended, 1);

        let rows = node.store.pending_onchain_transactions(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action_type, ActionType::Mint as u8);
        assert_eq!(rows[0].paying_address, minter.address());

        let position = node.store.chain_position().unwrap().unwrap();
        assert_eq!(position.block_height, 12);
    }

    #[test]
    fn test_duplicate_block_replay_does_not_double_ingest() {
        let node = TestNode::new();
        let mint = Actor::new().mint("Warehouse", 100);
        let b = block(12, vec![mint_tx("aa", &mint)]);

        node.ingestor.apply_block(&b).unwrap();
        assert_eq!(node.ingestor.apply_block(&b).unwrap(), 0);
        assert_eq!(node.store.pending_onchain_transactions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_second_envelope_in_one_transaction_is_ignored() {
        let node = TestNode::new();
        let minter = Actor::new();
        let mint = minter.mint("Warehouse", 100);

        let tx = RawTransaction {
            tx_hash: "aa".into(),
            outputs: vec![
                data_output(&mint_envelope(mint.hash)),
                data_output(&payment_envelope([7u8; 32])),
                pay_output(&minter.address(), 1_000),
            ],
        };
        node.ingestor.apply_block(&block(3, vec![tx])).unwrap();

        let rows = node.store.pending_onchain_transactions(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action_type, ActionType::Mint as u8);
    }

    #[test]
    fn test_blocks_without_protocol_traffic_still_advance_checkpoint() {
        let node = TestNode::new();
        let tx = RawTransaction {
            tx_hash: "plain".into(),
            outputs: vec![pay_output("Asomeone", 250)],
        };
        assert_eq!(node.ingestor.apply_block(&block(4, vec![tx])).unwrap(), 0);
        assert_eq!(
            node.store.chain_position().unwrap().unwrap().block_height,
            4
        );
    }
}
