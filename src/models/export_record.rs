use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::models::EnrichedTransaction;

/// Final, immutable row shape of the daily export. Column order is fixed:
/// Date, TxHash, Destination, Amount, Memo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "TxHash")]
    pub tx_hash: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Memo")]
    pub memo: String,
}

impl ExportRecord {
    /// Map a surviving enriched transaction to its export row. The mapping is
    /// partial: a transaction missing its timestamp or memo, or carrying a
    /// zero amount, maps to nothing.
    pub fn from_enriched(tx: &EnrichedTransaction) -> Option<Self> {
        let timestamp = tx.block_timestamp?;
        let memo = tx.memo.as_deref().filter(|m| !m.is_empty())?;
        if tx.normalized_amount == "0" {
            return None;
        }

        Some(Self {
            date: iso8601_utc(timestamp)?,
            tx_hash: tx.transaction_hash.clone(),
            destination: tx.destination.clone(),
            amount: tx.normalized_amount.clone(),
            memo: memo.to_string(),
        })
    }
}

/// ISO-8601 UTC instant with millisecond precision and Z suffix,
/// e.g. "2022-01-01T00:00:00.000Z".
fn iso8601_utc(unix_seconds: u64) -> Option<String> {
    let instant = DateTime::from_timestamp(i64::try_from(unix_seconds).ok()?, 0)?;
    Some(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}
