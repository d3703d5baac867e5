use thiserror::Error;

/// Main error type for the USDT memo exporter
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// RPC-related errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i32, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Transaction not found: {hash}")]
    TransactionNotFound { hash: String },

    #[error("Block not found: {block_number}")]
    BlockNotFound { block_number: u64 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    MissingValue(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
}

/// Errors from the final CSV persistence step
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    /// Whether the error is scoped to a single batch or event, meaning the
    /// scan may log it and continue. Configuration and export errors always
    /// terminate the run.
    pub fn is_transient(&self) -> bool {
        match self {
            ExporterError::Rpc(_) => true,
            ExporterError::Config(_) => false,
            ExporterError::Export(_) => false,
        }
    }
}
