use serde::{Deserialize, Serialize};

/// One matching Transfer log as returned by the RPC gateway. Ephemeral,
/// consumed immediately by the event scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTransferEvent {
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u32,
    pub from_address: String,
    pub to_address: String,
    /// Base-unit amount as emitted by the contract
    pub raw_amount: u128,
}

/// A transfer event joined with its transaction and block lookups.
/// Absent fields signal an upstream data gap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedTransaction {
    pub block_number: u64,
    pub log_index: u32,
    pub transaction_hash: String,
    pub destination: String,
    pub block_timestamp: Option<u64>,
    pub memo: Option<String>,
    /// Human-readable amount, fixed 6-decimal scale
    pub normalized_amount: String,
}

/// Convert a base-unit amount to its human-readable decimal string using a
/// fixed decimal scale. 5_000_000 base units at 6 decimals formats as "5";
/// trailing fractional zeros are trimmed.
pub fn format_base_units(raw: u128, decimals: u32) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    let divisor = 10u128.pow(decimals);
    let whole = raw / divisor;
    let fraction = raw % divisor;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_base_units_whole() {
        // 5 USDT = 5_000_000 base units at 6 decimals (mwei scale)
        assert_eq!(format_base_units(5_000_000, 6), "5");
        assert_eq!(format_base_units(1_000_000, 6), "1");
        assert_eq!(format_base_units(0, 6), "0");
    }

    #[test]
    fn test_format_base_units_fractional() {
        assert_eq!(format_base_units(5_500_000, 6), "5.5");
        assert_eq!(format_base_units(1, 6), "0.000001");
        assert_eq!(format_base_units(123_456, 6), "0.123456");
        assert_eq!(format_base_units(1_230_000, 6), "1.23");
    }

    #[test]
    fn test_format_base_units_zero_decimals() {
        assert_eq!(format_base_units(42, 0), "42");
    }

    #[test]
    fn test_format_base_units_large_amount() {
        // Amounts beyond u64 still format exactly
        assert_eq!(
            format_base_units(123_456_789_012_345_678_901_234_567, 6),
            "123456789012345678901.234567"
        );
    }

    #[test]
    fn test_raw_transfer_event_serialization() {
        let event = RawTransferEvent {
            block_number: 12345,
            transaction_hash: "0xabc123".to_string(),
            log_index: 2,
            from_address: "0xf977814e90da44bfa03b6295a0616a897441acec".to_string(),
            to_address: "0x1234567890123456789012345678901234567890".to_string(),
            raw_amount: 5_000_000,
        };

        let json = serde_json::to_string(&event).expect("Failed to serialize");
        assert!(json.contains("\"block_number\":12345"));
        assert!(json.contains("\"raw_amount\":5000000"));

        let deserialized: RawTransferEvent =
            serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_enriched_transaction_serialization() {
        let tx = EnrichedTransaction {
            block_number: 12345,
            log_index: 0,
            transaction_hash: "0xabc123".to_string(),
            destination: "0x1234567890123456789012345678901234567890".to_string(),
            block_timestamp: Some(1_640_995_200),
            memo: Some("INV1001".to_string()),
            normalized_amount: "5".to_string(),
        };

        let json = serde_json::to_string(&tx).expect("Failed to serialize");
        assert!(json.contains("\"memo\":\"INV1001\""));

        let deserialized: EnrichedTransaction =
            serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(tx, deserialized);
    }
}
