use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;

use crate::blockchain::{BlockWindow, EventScanner, RpcClient, ScanReport};
use crate::config::AppConfig;
use crate::error::{ExporterError, Result};
use crate::export::CsvExporter;
use crate::logging::LogContext;
use crate::models::ExportRecord;

/// What a completed run produced
#[derive(Debug)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub rows_written: usize,
    pub window: BlockWindow,
    pub report: ScanReport,
}

/// One full export run: current height, lookback window, batched scan,
/// record mapping, dated CSV. Only the initial height fetch and the final
/// persistence step can fail the run; everything in between degrades to
/// logged skips.
pub async fn run_export(config: &AppConfig) -> Result<ExportSummary> {
    let rpc_client = RpcClient::new_with_timeout(
        config.rpc.endpoint.clone(),
        config.rpc.timeout_seconds,
    );

    let current_height = rpc_client
        .get_latest_block_number()
        .await
        .map_err(ExporterError::Rpc)?;
    let window = BlockWindow::lookback(current_height, config.scan.lookback_blocks);

    let context = LogContext::new("pipeline", "run_export")
        .with_batch_range(window.start_block, window.end_block)
        .with_metadata("current_height", json!(current_height));
    context.info("Starting export run");

    let scanner = EventScanner::new(rpc_client, &config.scan);
    let outcome = scanner.scan(window, config.scan.batch_size).await;

    let records: Vec<ExportRecord> = outcome
        .transactions
        .iter()
        .filter_map(ExportRecord::from_enriched)
        .collect();

    let exporter = CsvExporter::new(&config.export.output_dir);
    let file_name = CsvExporter::dated_file_name(Utc::now().date_naive());
    let output_path = exporter.export(&records, &file_name)?;

    let context = LogContext::new("pipeline", "run_export")
        .with_metadata("path", json!(output_path.to_string_lossy()))
        .with_metadata("rows", json!(records.len()))
        .with_metadata("report", json!(outcome.report));
    context.info("Export run finished");

    Ok(ExportSummary {
        output_path,
        rows_written: records.len(),
        window,
        report: outcome.report,
    })
}
