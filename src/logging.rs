use log::{debug, error, info, trace, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Structured logging context for the exporter
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.with_metadata("block_number", json!(block_number))
    }

    pub fn with_transaction_hash(self, tx_hash: &str) -> Self {
        self.with_metadata("transaction_hash", json!(tx_hash))
    }

    pub fn with_batch_range(self, from_block: u64, to_block: u64) -> Self {
        self.with_metadata("from_block", json!(from_block))
            .with_metadata("to_block", json!(to_block))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Scan and export metrics
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(method: &str, success: bool) {
        let context = LogContext::new("metrics", "rpc_call")
            .with_metadata("method", json!(method))
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed", method));
        } else {
            context.warn(&format!("RPC call {} failed", method));
        }
    }

    pub fn log_batch_scanned(from_block: u64, to_block: u64, event_count: usize) {
        let context = LogContext::new("metrics", "batch_scanned")
            .with_batch_range(from_block, to_block)
            .with_metadata("event_count", json!(event_count));

        context.debug(&format!(
            "Batch [{}, {}] yielded {} transfer events",
            from_block, to_block, event_count
        ));
    }

    pub fn log_skipped_transaction(tx_hash: &str, reason: &str) {
        let context = LogContext::new("metrics", "transaction_skipped")
            .with_transaction_hash(tx_hash)
            .with_metadata("reason", json!(reason));

        context.warn(&format!("Skipping transaction ({}): {}", reason, tx_hash));
    }

    pub fn log_export_written(path: &str, row_count: usize) {
        let context = LogContext::new("metrics", "export_written")
            .with_metadata("path", json!(path))
            .with_metadata("row_count", json!(row_count));

        context.info(&format!("Export {} written with {} rows", path, row_count));
    }
}

/// Initialize structured logging for the application
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;

            // Try to parse as JSON for structured logs
            if let Ok(json_value) = serde_json::from_str::<Value>(record.args().to_string().as_str()) {
                writeln!(buf, "{}", serde_json::to_string_pretty(&json_value)?)
            } else {
                // Fall back to standard format for non-structured logs
                writeln!(
                    buf,
                    "{} [{}] {}: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            }
        })
        .init();

    info!("Structured logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_context_creation() {
        let context = LogContext::new("test_component", "test_operation");
        assert_eq!(context.component, "test_component");
        assert_eq!(context.operation, "test_operation");
        assert!(context.metadata.is_empty());
    }

    #[test]
    fn test_log_context_with_metadata() {
        let context = LogContext::new("test", "test")
            .with_block_number(12345)
            .with_transaction_hash("0xabc123")
            .with_batch_range(100, 200);

        assert_eq!(context.metadata.get("block_number"), Some(&json!(12345)));
        assert_eq!(
            context.metadata.get("transaction_hash"),
            Some(&json!("0xabc123"))
        );
        assert_eq!(context.metadata.get("from_block"), Some(&json!(100)));
        assert_eq!(context.metadata.get("to_block"), Some(&json!(200)));
    }

    #[test]
    fn test_log_context_format_message() {
        let context = LogContext::new("test", "test").with_metadata("key", json!("value"));

        let message = context.format_message("INFO", "test message");

        let parsed: Value = serde_json::from_str(&message).expect("Should be valid JSON");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["component"], "test");
        assert_eq!(parsed["operation"], "test");
        assert_eq!(parsed["message"], "test message");
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn test_metrics_logging() {
        // These should not panic
        MetricsLogger::log_rpc_call("eth_getLogs", true);
        MetricsLogger::log_batch_scanned(100, 200, 5);
        MetricsLogger::log_skipped_transaction("0xabc", "empty memo");
        MetricsLogger::log_export_written("transactions_2024-01-01.csv", 3);
    }
}
