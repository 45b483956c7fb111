//! Inbound gossip admission.

use std::sync::Arc;

use la_01_protocol::{GossipEnvelope, GossipPayload, GossipTag};
use la_03_ledger_store::LedgerStore;
use shared_crypto::{PublicKey, Signature};
use shared_types::{hash_hex, Hash32};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::GossipError;

/// Verifies and stores records received from peers.
///
/// Admission requires three proofs: the embedded hash matches the record
/// content, the signature over that hash verifies against the embedded
/// public key, and that key derives the claimed actor address. Anything
/// less is a spoof and is rejected terminally.
///
/// Admitted records are stored unconfirmed and never re-announced; they
/// only gain effect once the reconciliation engine matches them to an
/// on-chain commitment.
pub struct InboundHandler {
    store: Arc<dyn LedgerStore>,
}

impl InboundHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn handle(&self, bytes: &[u8]) -> Result<(), GossipError> {
        let envelope = GossipEnvelope::decode(bytes)?;
        match envelope.payload {
            GossipPayload::Mint(mut mint) => {
                require_content_hash(&mint.hash, &mint.content_hash())?;
                verify_actor(&mint.public_key, &mint.signature, &mint.hash, &mint.owner_address)?;
                mint.gossiped = true;
                self.store.save_unconfirmed_mint(mint)?;
            }
            GossipPayload::Invoice(mut invoice) => {
                require_content_hash(&invoice.hash, &invoice.content_hash())?;
                verify_actor(
                    &invoice.public_key,
                    &invoice.signature,
                    &invoice.hash,
                    &invoice.seller_address,
                )?;
                invoice.gossiped = true;
                self.store.save_unconfirmed_invoice(invoice)?;
            }
            GossipPayload::SellOffer(mut offer) => {
                require_content_hash(&offer.hash, &offer.content_hash())?;
                verify_actor(&offer.public_key, &offer.signature, &offer.hash, &offer.offerer_address)?;
                offer.gossiped = true;
                self.store.save_sell_offer(offer)?;
            }
            GossipPayload::BuyOffer(mut offer) => {
                require_content_hash(&offer.hash, &offer.content_hash())?;
                verify_actor(&offer.public_key, &offer.signature, &offer.hash, &offer.offerer_address)?;
                offer.gossiped = true;
                self.store.save_buy_offer(offer)?;
            }
            GossipPayload::DeleteSellOffer {
                hash,
                public_key,
                signature,
            } => {
                let Some(offer) = self.store.sell_offer_by_hash(&hash)? else {
                    debug!(hash = %hash_hex(&hash), "delete for unknown sell offer, ignoring");
                    return Ok(());
                };
                verify_delete(&offer.public_key, &public_key, &signature, &hash)?;
                self.store.delete_sell_offer(&hash)?;
                info!(hash = %hash_hex(&hash), "sell offer deleted by owner");
            }
            GossipPayload::DeleteBuyOffer {
                hash,
                public_key,
                signature,
            } => {
                let Some(offer) = self.store.buy_offer_by_hash(&hash)? else {
                    debug!(hash = %hash_hex(&hash), "delete for unknown buy offer, ignoring");
                    return Ok(());
                };
                verify_delete(&offer.public_key, &public_key, &signature, &hash)?;
                self.store.delete_buy_offer(&hash)?;
                info!(hash = %hash_hex(&hash), "buy offer deleted by owner");
            }
        }
        Ok(())
    }

    /// Drives admission until the transport channel closes or shutdown is
    /// signalled.
    pub async fn run(
        self,
        mut inbound: mpsc::UnboundedReceiver<(GossipTag, Vec<u8>)>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("gossip inbound handler started");
        loop {
            tokio::select! {
                received = inbound.recv() => {
                    match received {
                        Some((tag, bytes)) => {
                            if let Err(err) = self.handle(&bytes) {
                                warn!(tag = tag.as_str(), error = %err, "rejected gossip message");
                            }
                        }
                        None => {
                            info!("gossip transport closed, inbound handler stopping");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown signal received, gossip inbound handler stopping");
                    break;
                }
            }
        }
    }
}

fn require_content_hash(claimed: &Hash32, actual: &Hash32) -> Result<(), GossipError> {
    if claimed != actual {
        return Err(GossipError::HashMismatch {
            hash: hash_hex(claimed),
        });
    }
    Ok(())
}

/// Signature plus identity check: the key must sign the record hash and
/// derive the claimed actor address.
fn verify_actor(
    public_key_hex: &str,
    signature_hex: &str,
    hash: &Hash32,
    claimed_address: &str,
) -> Result<(), GossipError> {
    let key = PublicKey::from_hex(public_key_hex)?;
    let signature = Signature::from_hex(signature_hex)?;
    key.verify(hash, &signature)?;

    let derived = key.to_address();
    if derived != claimed_address {
        return Err(GossipError::AddressMismatch {
            claimed: claimed_address.to_string(),
            derived,
        });
    }
    Ok(())
}

/// A delete event must be signed by the key that created the offer.
fn verify_delete(
    offer_key_hex: &str,
    event_key_hex: &str,
    signature_hex: &str,
    hash: &Hash32,
) -> Result<(), GossipError> {
    if offer_key_hex != event_key_hex {
        return Err(GossipError::KeyMismatch {
            hash: hash_hex(hash),
        });
    }
    let key = PublicKey::from_hex(event_key_hex)?;
    let signature = Signature::from_hex(signature_hex)?;
    key.verify(hash, &signature)?;
    Ok(())
}
