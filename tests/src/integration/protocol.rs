//! Envelope codec behavior over raw OP_RETURN scripts.

#[cfg(test)]
mod tests {
    use la_01_protocol::{
        mint_envelope, op_return_script, parse_op_return, ActionType, Decoded, MessageEnvelope,
        OnChainMintMessage,
    };

    #[test]
    fn test_envelope_survives_script_embedding() {
        let hash = [0x42u8; 32];
        let script = op_return_script(&mint_envelope(hash).encode());

        let payload = parse_op_return(&script).expect("script parses");
        let Decoded::Message(envelope) = MessageEnvelope::decode(payload).unwrap() else {
            panic!("expected protocol message");
        };
        assert_eq!(envelope.action, ActionType::Mint);
        assert_eq!(OnChainMintMessage::decode(&envelope.payload).unwrap().mint_hash, hash);
    }

    #[test]
    fn test_foreign_traffic_is_filtered_not_an_error() {
        // Valid frames from some other protocol share the chain with us.
        let foreign = [0xDEu8, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03];
        assert!(matches!(
            MessageEnvelope::decode(&foreign),
            Ok(Decoded::NotProtocol)
        ));
    }

    #[test]
    fn test_truncated_frames_are_malformed() {
        let wire = mint_envelope([1u8; 32]).encode();
        for len in 0..5 {
            assert!(
                MessageEnvelope::decode(&wire[..len]).is_err(),
                "{len}-byte frame must be malformed"
            );
        }
    }

    #[test]
    fn test_non_op_return_script_yields_no_payload() {
        // p2pkh script prefix.
        assert!(parse_op_return(&[0x76, 0xA9, 0x14]).is_none());
    }
}
