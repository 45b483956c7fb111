//! Full off-chain/on-chain reconciliation flows through the engine.

#[cfg(test)]
mod tests {
    use crate::support::{block, invoice_tx, mint_tx, payment_tx, Actor, TestNode};
    use la_03_ledger_store::LedgerStore;

    #[test]
    fn test_mint_row_retries_until_offchain_half_arrives() {
        let node = TestNode::new();
        let minter = Actor::new();
        let mint = minter.mint("Warehouse", 100);

        // Anchor lands before the record has been gossiped to us.
        node.ingest_and_reconcile(&block(5, vec![mint_tx("aa", &mint)]));
        assert!(node.store.mint_by_hash(&mint.hash).unwrap().is_none());
        assert_eq!(node.store.pending_onchain_transactions(10).unwrap().len(), 1);

        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        let summary = node.engine.tick().unwrap();
        assert_eq!(summary.consumed, 1);

        assert!(node.store.mint_by_hash(&mint.hash).unwrap().is_some());
        assert!(node.store.pending_onchain_transactions(10).unwrap().is_empty());
        assert_eq!(
            node.store
                .confirmed_balance(&minter.address(), &mint.hash)
                .unwrap(),
            100
        );
    }

    #[test]
    fn test_over_escrow_invoice_is_discarded_for_good() {
        let node = TestNode::new();
        let seller = Actor::new();
        let buyer = Actor::new();
        let mint = seller.mint("Warehouse", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![mint_tx("aa", &mint)]));

        let first = seller.invoice(&buyer, mint.hash, 50, 10);
        node.store.save_unconfirmed_invoice(first.clone()).unwrap();
        node.ingest_and_reconcile(&block(2, vec![invoice_tx("bb", &first)]));
        assert!(node.store.invoice_by_hash(&first.hash).unwrap().is_some());

        // 50 of 100 are escrowed, so a 60-unit invoice cannot be backed.
        let second = seller.invoice(&buyer, mint.hash, 60, 10);
        node.store.save_unconfirmed_invoice(second.clone()).unwrap();
        node.ingest_and_reconcile(&block(3, vec![invoice_tx("cc", &second)]));

        assert!(node.store.invoice_by_hash(&second.hash).unwrap().is_none());
        assert!(node
            .store
            .pending_balance(&second.hash, &mint.hash)
            .unwrap()
            .is_none());
        // The row is gone too: redelivery will not revive it.
        assert!(node.store.pending_onchain_transactions(10).unwrap().is_empty());
    }

    #[test]
    fn test_settlement_moves_exactly_the_invoiced_quantity() {
        let node = TestNode::new();
        let seller = Actor::new();
        let buyer = Actor::new();
        let mint = seller.mint("Warehouse", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![mint_tx("aa", &mint)]));

        let invoice = seller.invoice(&buyer, mint.hash, 30, 2);
        node.store.save_unconfirmed_invoice(invoice.clone()).unwrap();
        node.ingest_and_reconcile(&block(2, vec![invoice_tx("bb", &invoice)]));

        node.ingest_and_reconcile(&block(3, vec![payment_tx("cc", &invoice, 60)]));

        let paid = node.store.invoice_by_hash(&invoice.hash).unwrap().unwrap();
        assert!(paid.paid_at.is_some());
        assert_eq!(
            node.store
                .confirmed_balance(&seller.address(), &mint.hash)
                .unwrap(),
            70
        );
        assert_eq!(
            node.store
                .confirmed_balance(&buyer.address(), &mint.hash)
                .unwrap(),
            30
        );
        assert!(node
            .store
            .pending_balance(&invoice.hash, &mint.hash)
            .unwrap()
            .is_none());
    }

    /// 100-unit mint, 50 escrowed and sold, a 60-unit attempt bounced,
    /// final split 50/50.
    #[test]
    fn test_mint_invoice_payment_lifecycle() {
        let node = TestNode::new();
        let seller = Actor::new();
        let buyer = Actor::new();

        let mint = seller.mint("Grain silo", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![mint_tx("aa", &mint)]));

        let sale = seller.invoice(&buyer, mint.hash, 50, 20);
        node.store.save_unconfirmed_invoice(sale.clone()).unwrap();
        node.ingest_and_reconcile(&block(2, vec![invoice_tx("bb", &sale)]));

        let overdraft = seller.invoice(&buyer, mint.hash, 60, 20);
        node.store.save_unconfirmed_invoice(overdraft.clone()).unwrap();
        node.ingest_and_reconcile(&block(3, vec![invoice_tx("cc", &overdraft)]));
        assert!(node.store.invoice_by_hash(&overdraft.hash).unwrap().is_none());

        node.ingest_and_reconcile(&block(4, vec![payment_tx("dd", &sale, 1_000)]));

        let seller_balance = node
            .store
            .confirmed_balance(&seller.address(), &mint.hash)
            .unwrap();
        let buyer_balance = node
            .store
            .confirmed_balance(&buyer.address(), &mint.hash)
            .unwrap();
        assert_eq!(seller_balance, 50);
        assert_eq!(buyer_balance, 50);
        assert_eq!(seller_balance + buyer_balance, 100);
        assert!(node.store.pending_onchain_transactions(10).unwrap().is_empty());
    }

    #[test]
    fn test_underpaid_settlement_leaves_escrow_intact() {
        let node = TestNode::new();
        let seller = Actor::new();
        let buyer = Actor::new();
        let mint = seller.mint("Warehouse", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![mint_tx("aa", &mint)]));

        let invoice = seller.invoice(&buyer, mint.hash, 30, 2);
        node.store.save_unconfirmed_invoice(invoice.clone()).unwrap();
        node.ingest_and_reconcile(&block(2, vec![invoice_tx("bb", &invoice)]));

        // 59 paid against a 60 total.
        node.ingest_and_reconcile(&block(3, vec![payment_tx("cc", &invoice, 59)]));

        let unpaid = node.store.invoice_by_hash(&invoice.hash).unwrap().unwrap();
        assert!(unpaid.paid_at.is_none());
        assert!(node
            .store
            .pending_balance(&invoice.hash, &mint.hash)
            .unwrap()
            .is_some());
        assert_eq!(
            node.store
                .confirmed_balance(&buyer.address(), &mint.hash)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_sweep_releases_abandoned_escrow_and_stale_rows() {
        let node = TestNode::new();
        let seller = Actor::new();
        let buyer = Actor::new();
        let mint = seller.mint("Warehouse", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![mint_tx("aa", &mint)]));

        // Escrow forms but the invoice record never arrives, so the row
        // keeps retrying.
        let invoice = seller.invoice(&buyer, mint.hash, 40, 5);
        node.ingest_and_reconcile(&block(2, vec![invoice_tx("bb", &invoice)]));
        assert!(node
            .store
            .pending_balance(&invoice.hash, &mint.hash)
            .unwrap()
            .is_some());

        // Within the retention window nothing is touched.
        node.ingest_and_reconcile(&block(50, vec![]));
        let summary = node.sweeper.sweep().unwrap();
        assert_eq!(summary.expired_escrows, 0);

        node.ingest_and_reconcile(&block(150, vec![]));
        let summary = node.sweeper.sweep().unwrap();
        assert_eq!(summary.expired_escrows, 1);
        assert!(node
            .store
            .pending_balance(&invoice.hash, &mint.hash)
            .unwrap()
            .is_none());
        assert!(node.store.pending_onchain_transactions(10).unwrap().is_empty());
        assert_eq!(
            node.store.pending_total(&mint.hash, &seller.address()).unwrap(),
            0
        );
    }

    #[test]
    fn test_sweep_trims_expired_unconfirmed_mints() {
        let node = TestNode::new();
        let mint = Actor::new().mint("Warehouse", 100);
        node.store.save_unconfirmed_mint(mint.clone()).unwrap();
        node.ingest_and_reconcile(&block(1, vec![]));

        node.time.advance(86_401);
        let summary = node.sweeper.sweep().unwrap();
        assert_eq!(summary.trimmed_mints, 1);
        assert!(node.store.unconfirmed_mint_by_hash(&mint.hash).unwrap().is_none());
    }
}
