//! Envelope and address extraction from raw transactions.

use std::collections::BTreeMap;

use la_01_protocol::{parse_op_return, Decoded, MessageEnvelope};
use shared_types::Address;
use tracing::warn;

use crate::messages::{RawTransaction, TxOutput, SCRIPT_TYPE_NULLDATA, SCRIPT_TYPE_PUBKEYHASH};

/// First recognized protocol envelope in the transaction's data outputs.
///
/// A transaction carries at most one protocol action; any further data
/// outputs are ignored. Foreign OP_RETURN traffic (wrong magic) is skipped
/// silently, while envelopes that carry our magic but fail to decode are
/// logged and skipped.
pub fn envelope_from_tx(tx: &RawTransaction) -> Option<MessageEnvelope> {
    for output in data_outputs(tx) {
        let Some(payload) = parse_op_return(&output.script) else {
            continue;
        };
        match MessageEnvelope::decode(payload) {
            Ok(Decoded::Message(envelope)) => return Some(envelope),
            Ok(Decoded::NotProtocol) => continue,
            Err(err) => {
                warn!(tx_hash = %tx.tx_hash, error = %err, "skipping undecodable envelope");
                continue;
            }
        }
    }
    None
}

/// The acting party: the first address of the first pay-to-pubkey-hash
/// output. `None` when the transaction pays no recognizable address.
pub fn paying_address(tx: &RawTransaction) -> Option<Address> {
    tx.outputs
        .iter()
        .filter(|o| o.script_type == SCRIPT_TYPE_PUBKEYHASH)
        .find_map(|o| o.addresses.first().cloned())
}

/// Total koinu paid to each address across the transaction's outputs.
pub fn output_values(tx: &RawTransaction) -> BTreeMap<Address, u64> {
    let mut values = BTreeMap::new();
    for output in &tx.outputs {
        if output.script_type != SCRIPT_TYPE_PUBKEYHASH {
            continue;
        }
        for address in &output.addresses {
            *values.entry(address.clone()).or_insert(0) += output.value;
        }
    }
    values
}

fn data_outputs(tx: &RawTransaction) -> impl Iterator<Item = &TxOutput> {
    tx.outputs
        .iter()
        .filter(|o| o.script_type == SCRIPT_TYPE_NULLDATA)
}
