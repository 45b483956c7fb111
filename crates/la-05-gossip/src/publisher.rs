//! Outbound record propagation.

use std::sync::Arc;
use std::time::Duration;

use la_01_protocol::{GossipEnvelope, GossipPayload};
use la_03_ledger_store::LedgerStore;
use shared_types::{Mint, UnconfirmedMint};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::GossipError;
use crate::transport::GossipTransport;

/// Polls the store for records peers have not seen and announces them.
///
/// A record is marked gossiped only after the transport accepted it, so a
/// failed send is retried on the next poll. Confirmed mints are announced
/// in their off-chain shape; late-joining peers store them as unconfirmed
/// and match them against their own retained on-chain rows.
pub struct GossipPublisher {
    store: Arc<dyn LedgerStore>,
    transport: Arc<dyn GossipTransport>,
    batch_size: usize,
}

impl GossipPublisher {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        transport: Arc<dyn GossipTransport>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            transport,
            batch_size,
        }
    }

    /// One outbox drain. Returns the number of records announced.
    pub fn publish_once(&self) -> Result<usize, GossipError> {
        let mut sent = 0;

        for mint in self.store.ungossiped_unconfirmed_mints(self.batch_size)? {
            let hash = mint.hash;
            self.announce(GossipPayload::Mint(mint))?;
            self.store.mark_unconfirmed_mint_gossiped(&hash)?;
            sent += 1;
        }
        for mint in self.store.ungossiped_mints(self.batch_size)? {
            let hash = mint.hash;
            self.announce(GossipPayload::Mint(off_chain_shape(mint)))?;
            self.store.mark_mint_gossiped(&hash)?;
            sent += 1;
        }
        for invoice in self.store.ungossiped_unconfirmed_invoices(self.batch_size)? {
            let hash = invoice.hash;
            self.announce(GossipPayload::Invoice(invoice))?;
            self.store.mark_unconfirmed_invoice_gossiped(&hash)?;
            sent += 1;
        }
        for offer in self.store.ungossiped_sell_offers(self.batch_size)? {
            let hash = offer.hash;
            self.announce(GossipPayload::SellOffer(offer))?;
            self.store.mark_sell_offer_gossiped(&hash)?;
            sent += 1;
        }
        for offer in self.store.ungossiped_buy_offers(self.batch_size)? {
            let hash = offer.hash;
            self.announce(GossipPayload::BuyOffer(offer))?;
            self.store.mark_buy_offer_gossiped(&hash)?;
            sent += 1;
        }

        if sent > 0 {
            debug!(sent, "gossip outbox drained");
        }
        Ok(sent)
    }

    fn announce(&self, payload: GossipPayload) -> Result<(), GossipError> {
        let tag = payload.tag();
        let envelope = GossipEnvelope::new(payload);
        self.transport.send(tag, &envelope.encode())
    }

    /// Periodic publishing loop.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("gossip publisher started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.publish_once() {
                        warn!(error = %err, "gossip publish failed, outbox retained");
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received, gossip publisher stopping");
                    break;
                }
            }
        }
    }
}

/// A confirmed mint reduced to the metadata peers need for matching.
fn off_chain_shape(mint: Mint) -> UnconfirmedMint {
    UnconfirmedMint {
        id: mint.id,
        hash: mint.hash,
        title: mint.title,
        fraction_count: mint.fraction_count,
        description: mint.description,
        tags: mint.tags,
        metadata: mint.metadata,
        requirements: mint.requirements,
        lockup_options: mint.lockup_options,
        feed_url: mint.feed_url,
        owner_address: mint.owner_address,
        public_key: mint.public_key,
        signature: mint.signature,
        created_at: mint.created_at,
        gossiped: false,
    }
}
