use log::warn;

/// Calldata marker for a transaction with no data field
pub const EMPTY_CALLDATA: &str = "0x";

/// Byte offset of the memo region in a token-transfer payload:
/// 4-byte method selector + 32-byte recipient + 32-byte amount.
const MEMO_BYTE_OFFSET: usize = 68;

/// Extract the free-text memo this deployment appends after the standard
/// 68-byte transfer payload. Best effort by design: a payload with no
/// trailing bytes, malformed hex, or non-ASCII content yields an empty memo
/// rather than an error.
pub fn decode_memo(calldata: &str) -> String {
    if calldata == EMPTY_CALLDATA {
        return String::new();
    }

    let hex_payload = calldata.strip_prefix("0x").unwrap_or(calldata);
    if hex_payload.len() <= MEMO_BYTE_OFFSET * 2 {
        return String::new();
    }

    let memo_hex = &hex_payload[MEMO_BYTE_OFFSET * 2..];
    let bytes = match hex::decode(memo_hex) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to decode memo hex: {}", e);
            return String::new();
        }
    };

    if !bytes.is_ascii() {
        warn!("Memo bytes are not valid ASCII, treating as no memo");
        return String::new();
    }

    String::from_utf8(bytes).unwrap_or_default()
}
