//! Two-node record propagation and inbound admission.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::support::{block, mint_tx, Actor, TestNode};
    use la_01_protocol::{GossipEnvelope, GossipPayload};
    use la_03_ledger_store::LedgerStore;
    use la_05_gossip::{GossipPublisher, InboundHandler, LoopbackTransport};

    #[test]
    fn test_record_propagates_and_confirms_on_the_receiving_node() {
        let seller = TestNode::new();
        let follower = TestNode::new();
        let minter = Actor::new();
        let mint = minter.mint("Warehouse", 100);

        seller.store.save_unconfirmed_mint(mint.clone()).unwrap();

        let (transport, mut wire) = LoopbackTransport::new();
        let publisher = GossipPublisher::new(seller.store.clone(), Arc::new(transport), 16);
        let inbound = InboundHandler::new(follower.store.clone());

        assert_eq!(publisher.publish_once().unwrap(), 1);
        while let Ok((_, bytes)) = wire.try_recv() {
            inbound.handle(&bytes).unwrap();
        }

        // The record arrives unconfirmed and moves no balance on its own.
        let received = follower
            .store
            .unconfirmed_mint_by_hash(&mint.hash)
            .unwrap()
            .unwrap();
        assert!(received.gossiped);
        assert_eq!(
            follower
                .store
                .confirmed_balance(&minter.address(), &mint.hash)
                .unwrap(),
            0
        );

        // Both nodes see the same anchor and converge.
        let anchor = block(7, vec![mint_tx("aa", &mint)]);
        seller.ingest_and_reconcile(&anchor);
        follower.ingest_and_reconcile(&anchor);

        for node in [&seller, &follower] {
            assert!(node.store.mint_by_hash(&mint.hash).unwrap().is_some());
            assert_eq!(
                node.store
                    .confirmed_balance(&minter.address(), &mint.hash)
                    .unwrap(),
                100
            );
        }
    }

    #[test]
    fn test_received_records_are_not_reannounced() {
        let origin = TestNode::new();
        let relay = TestNode::new();
        let mint = Actor::new().mint("Warehouse", 100);
        origin.store.save_unconfirmed_mint(mint).unwrap();

        let (transport, mut wire) = LoopbackTransport::new();
        GossipPublisher::new(origin.store.clone(), Arc::new(transport), 16)
            .publish_once()
            .unwrap();
        let inbound = InboundHandler::new(relay.store.clone());
        while let Ok((_, bytes)) = wire.try_recv() {
            inbound.handle(&bytes).unwrap();
        }

        let (transport, mut relay_wire) = LoopbackTransport::new();
        let relayed = GossipPublisher::new(relay.store.clone(), Arc::new(transport), 16)
            .publish_once()
            .unwrap();
        assert_eq!(relayed, 0);
        assert!(relay_wire.try_recv().is_err());
    }

    #[test]
    fn test_spoofed_owner_address_is_rejected_end_to_end() {
        let follower = TestNode::new();
        let attacker = Actor::new();
        let mut mint = attacker.mint("Warehouse", 100);
        mint.owner_address = "A".repeat(43);
        mint.hash = mint.content_hash();
        mint.signature = attacker.sign(&mint.hash);

        let bytes = GossipEnvelope::new(GossipPayload::Mint(mint.clone())).encode();
        let inbound = InboundHandler::new(follower.store.clone());
        assert!(inbound.handle(&bytes).is_err());
        assert!(follower
            .store
            .unconfirmed_mint_by_hash(&mint.hash)
            .unwrap()
            .is_none());
    }
}
