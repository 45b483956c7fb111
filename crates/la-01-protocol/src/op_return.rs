//! OP_RETURN script helpers.
//!
//! Transaction construction itself is a wallet concern, but the engine
//! still needs to wrap envelope bytes into a data-carrier script (for
//! clients building commitments) and to unwrap them when a follower hands
//! over raw script bytes instead of extracted data.

/// OP_RETURN opcode.
const OP_RETURN: u8 = 0x6A;

/// Wraps envelope bytes into an OP_RETURN script.
///
/// Uses the single-byte push form, which covers every protocol payload
/// (commitments are far under 75 bytes).
pub fn op_return_script(data: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(2 + data.len());
    script.push(OP_RETURN);
    script.push(data.len() as u8);
    script.extend_from_slice(data);
    script
}

/// Extracts the pushed data from an OP_RETURN script, if it is one.
pub fn parse_op_return(script: &[u8]) -> Option<&[u8]> {
    if script.len() < 2 || script[0] != OP_RETURN {
        return None;
    }
    let len = script[1] as usize;
    if script.len() != 2 + len {
        return None;
    }
    Some(&script[2..])
}
