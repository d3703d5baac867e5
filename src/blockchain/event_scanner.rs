use serde::Serialize;
use serde_json::json;

use crate::blockchain::memo_decoder::decode_memo;
use crate::blockchain::range_planner::BlockWindow;
use crate::blockchain::rpc_client::RpcClient;
use crate::config::ScanConfig;
use crate::logging::{LogContext, MetricsLogger};
use crate::models::{format_base_units, EnrichedTransaction, RawTransferEvent};

/// Why a discovered event was excluded from the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    FetchFailed,
    MissingTimestamp,
    EmptyMemo,
    ZeroAmount,
}

impl SkipReason {
    fn as_str(&self) -> &'static str {
        match self {
            SkipReason::FetchFailed => "transaction fetch failed",
            SkipReason::MissingTimestamp => "unresolvable timestamp",
            SkipReason::EmptyMemo => "empty memo",
            SkipReason::ZeroAmount => "zero amount",
        }
    }
}

/// Structured per-run diagnostics: every lossy decision the scan makes is
/// counted by reason so the best-effort policy stays auditable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub batches_scanned: u32,
    pub batches_failed: u32,
    pub events_discovered: u32,
    pub skipped_fetch_failed: u32,
    pub skipped_missing_timestamp: u32,
    pub skipped_empty_memo: u32,
    pub skipped_zero_amount: u32,
}

impl ScanReport {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::FetchFailed => self.skipped_fetch_failed += 1,
            SkipReason::MissingTimestamp => self.skipped_missing_timestamp += 1,
            SkipReason::EmptyMemo => self.skipped_empty_memo += 1,
            SkipReason::ZeroAmount => self.skipped_zero_amount += 1,
        }
    }

    pub fn total_skipped(&self) -> u32 {
        self.skipped_fetch_failed
            + self.skipped_missing_timestamp
            + self.skipped_empty_memo
            + self.skipped_zero_amount
    }
}

/// Result of one scan run: the surviving transactions in chain order plus
/// the skip diagnostics
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub transactions: Vec<EnrichedTransaction>,
    pub report: ScanReport,
}

/// Drives the range planner and RPC gateway across the full window. Failures
/// never abort the run: a failed batch yields zero events, a failed event is
/// logged and skipped.
pub struct EventScanner {
    rpc_client: RpcClient,
    watched_address: String,
    token_contract_address: String,
    token_decimals: u32,
}

impl EventScanner {
    pub fn new(rpc_client: RpcClient, scan_config: &ScanConfig) -> Self {
        Self {
            rpc_client,
            watched_address: scan_config.watched_address.clone(),
            token_contract_address: scan_config.token_contract_address.clone(),
            token_decimals: scan_config.token_decimals,
        }
    }

    /// Scan the window batch by batch, enriching and filtering each
    /// discovered transfer event. Output order is ascending block, then log
    /// index within block.
    pub async fn scan(&self, window: BlockWindow, batch_size: u64) -> ScanOutcome {
        let mut transactions = Vec::new();
        let mut report = ScanReport::default();

        for batch in window.batches(batch_size) {
            let mut events = match self
                .rpc_client
                .get_transfer_logs(
                    &self.token_contract_address,
                    &self.watched_address,
                    batch.from_block,
                    batch.to_block,
                )
                .await
            {
                Ok(events) => events,
                Err(e) => {
                    // Lossy-but-live: the failed batch contributes nothing
                    let context = LogContext::new("event_scanner", "batch_failed")
                        .with_batch_range(batch.from_block, batch.to_block)
                        .with_metadata("error", json!(e.to_string()));
                    context.warn("Failed to fetch transfer logs, skipping batch");
                    report.batches_failed += 1;
                    continue;
                }
            };

            report.batches_scanned += 1;
            report.events_discovered += events.len() as u32;
            MetricsLogger::log_batch_scanned(batch.from_block, batch.to_block, events.len());

            events.sort_by_key(|e| (e.block_number, e.log_index));

            for event in &events {
                match self.enrich_event(event).await {
                    Ok(tx) => transactions.push(tx),
                    Err(reason) => {
                        MetricsLogger::log_skipped_transaction(
                            &event.transaction_hash,
                            reason.as_str(),
                        );
                        report.record_skip(reason);
                    }
                }
            }
        }

        let context = LogContext::new("event_scanner", "scan_complete")
            .with_metadata("report", json!(report))
            .with_metadata("exported", json!(transactions.len()));
        context.info(&format!(
            "Scan complete: {} of {} events qualify",
            transactions.len(),
            report.events_discovered
        ));

        ScanOutcome {
            transactions,
            report,
        }
    }

    /// Join an event with its transaction and block lookups, applying the
    /// three skip conditions: timestamp is mandatory, memo must be non-empty,
    /// amount must be nonzero.
    async fn enrich_event(
        &self,
        event: &RawTransferEvent,
    ) -> Result<EnrichedTransaction, SkipReason> {
        let tx = self
            .rpc_client
            .get_transaction(&event.transaction_hash)
            .await
            .map_err(|_| SkipReason::FetchFailed)?;

        let timestamp = self
            .rpc_client
            .get_block_timestamp(event.block_number)
            .await
            .map_err(|_| SkipReason::MissingTimestamp)?;

        let memo = decode_memo(&tx.input);
        if memo.is_empty() {
            return Err(SkipReason::EmptyMemo);
        }

        if event.raw_amount == 0 {
            return Err(SkipReason::ZeroAmount);
        }

        Ok(EnrichedTransaction {
            block_number: event.block_number,
            log_index: event.log_index,
            transaction_hash: event.transaction_hash.clone(),
            destination: event.to_address.clone(),
            block_timestamp: Some(timestamp),
            memo: Some(memo),
            normalized_amount: format_base_units(event.raw_amount, self.token_decimals),
        })
    }
}
