pub mod blockchain;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod pipeline;

pub use blockchain::{EventScanner, RpcClient};
pub use config::{AppConfig, ExportConfig, LoggingConfig, RpcConfig, ScanConfig};
pub use error::{ExporterError, Result};
pub use logging::{init_logging, LogContext, MetricsLogger};
pub use pipeline::{run_export, ExportSummary};
