use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub scan: ScanConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Ledger node JSON-RPC endpoint URL (required)
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Event scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Source account whose outgoing transfers are exported (required)
    pub watched_address: String,
    /// USDT token contract address (required)
    pub token_contract_address: String,
    /// Lookback window in blocks; 28_800 approximates one day at 3s blocks
    pub lookback_blocks: u64,
    /// eth_getLogs batch size, bounded by provider range limits
    pub batch_size: u64,
    /// Token decimal scale; USDT uses 6 (one unit = 1_000_000 base units)
    pub token_decimals: u32,
}

/// Export artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the dated CSV files are written into
    pub output_dir: String,
    /// UTC hour of day at which the scheduled run fires
    pub run_hour_utc: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            scan: ScanConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            watched_address: String::new(),
            token_contract_address: String::new(),
            lookback_blocks: 28_800,
            batch_size: 10_000,
            token_decimals: 6,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            run_hour_utc: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file().unwrap_or_default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file() -> Result<Self, ConfigError> {
        let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if !Path::new(&config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.clone()))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parsing(e.to_string()))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // RPC configuration
        if let Ok(endpoint) = env::var("RPC_ENDPOINT_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RPC_TIMEOUT_SECONDS".to_string(),
                value: timeout,
            })?;
        }

        // Scan configuration
        if let Ok(address) = env::var("WATCHED_ADDRESS") {
            self.scan.watched_address = address;
        }
        if let Ok(contract) = env::var("TOKEN_CONTRACT_ADDRESS") {
            self.scan.token_contract_address = contract;
        }
        if let Ok(lookback) = env::var("LOOKBACK_BLOCKS") {
            self.scan.lookback_blocks = lookback.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOOKBACK_BLOCKS".to_string(),
                value: lookback,
            })?;
        }
        if let Ok(batch_size) = env::var("SCAN_BATCH_SIZE") {
            self.scan.batch_size = batch_size.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SCAN_BATCH_SIZE".to_string(),
                value: batch_size,
            })?;
        }

        // Export configuration
        if let Ok(dir) = env::var("EXPORT_OUTPUT_DIR") {
            self.export.output_dir = dir;
        }
        if let Ok(hour) = env::var("EXPORT_RUN_HOUR_UTC") {
            self.export.run_hour_utc = hour.parse().map_err(|_| ConfigError::InvalidValue {
                key: "EXPORT_RUN_HOUR_UTC".to_string(),
                value: hour,
            })?;
        }

        // Logging configuration
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values. Missing required values are fatal
    /// before any RPC call is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingValue("RPC_ENDPOINT_URL".to_string()));
        }
        if !self.rpc.endpoint.starts_with("http://") && !self.rpc.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.rpc.endpoint.clone()));
        }

        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "rpc.timeout_seconds".to_string(),
                value: self.rpc.timeout_seconds.to_string(),
            });
        }

        if self.scan.watched_address.trim().is_empty() {
            return Err(ConfigError::MissingValue("WATCHED_ADDRESS".to_string()));
        }
        validate_address_format(&self.scan.watched_address)?;

        if self.scan.token_contract_address.trim().is_empty() {
            return Err(ConfigError::MissingValue(
                "TOKEN_CONTRACT_ADDRESS".to_string(),
            ));
        }
        validate_address_format(&self.scan.token_contract_address)?;

        if self.scan.lookback_blocks == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scan.lookback_blocks".to_string(),
                value: self.scan.lookback_blocks.to_string(),
            });
        }

        if self.scan.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scan.batch_size".to_string(),
                value: self.scan.batch_size.to_string(),
            });
        }

        if self.export.run_hour_utc > 23 {
            return Err(ConfigError::InvalidValue {
                key: "export.run_hour_utc".to_string(),
                value: self.export.run_hour_utc.to_string(),
            });
        }

        if self.export.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "export.output_dir".to_string(),
                value: self.export.output_dir.clone(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

fn validate_address_format(address: &str) -> Result<(), ConfigError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| ConfigError::InvalidAddress(address.to_string()))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::NamedTempFile;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.rpc.endpoint = "https://mainnet.example.org/".to_string();
        config.scan.watched_address = "0xf977814e90da44bfa03b6295a0616a897441acec".to_string();
        config.scan.token_contract_address =
            "0xdac17f958d2ee523a2206206994597c13d831ec7".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rpc.timeout_seconds, 30);
        assert_eq!(config.scan.lookback_blocks, 28_800);
        assert_eq!(config.scan.batch_size, 10_000);
        assert_eq!(config.scan.token_decimals, 6);
        assert_eq!(config.export.run_hour_utc, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = valid_config();
        assert!(config.validate().is_ok());

        // Missing endpoint is fatal
        let mut config = valid_config();
        config.rpc.endpoint = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue(_))
        ));

        // Invalid RPC endpoint
        let mut config = valid_config();
        config.rpc.endpoint = "invalid-url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        // Missing watched address is fatal
        let mut config = valid_config();
        config.scan.watched_address = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue(_))
        ));

        // Malformed token contract
        let mut config = valid_config();
        config.scan.token_contract_address = "0x1234".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress(_))
        ));

        // Zero batch size
        let mut config = valid_config();
        config.scan.batch_size = 0;
        assert!(config.validate().is_err());

        // Out-of-range run hour
        let mut config = valid_config();
        config.export.run_hour_utc = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("RPC_ENDPOINT_URL", "https://test-rpc.example.org/");
        env::set_var("WATCHED_ADDRESS", "0xf977814e90da44bfa03b6295a0616a897441acec");
        env::set_var(
            "TOKEN_CONTRACT_ADDRESS",
            "0xdac17f958d2ee523a2206206994597c13d831ec7",
        );
        env::set_var("LOOKBACK_BLOCKS", "57600");
        env::set_var("SCAN_BATCH_SIZE", "5000");
        env::set_var("EXPORT_RUN_HOUR_UTC", "7");
        env::set_var("LOG_LEVEL", "debug");

        let mut config = AppConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.rpc.endpoint, "https://test-rpc.example.org/");
        assert_eq!(
            config.scan.watched_address,
            "0xf977814e90da44bfa03b6295a0616a897441acec"
        );
        assert_eq!(config.scan.lookback_blocks, 57_600);
        assert_eq!(config.scan.batch_size, 5_000);
        assert_eq!(config.export.run_hour_utc, 7);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());

        env::remove_var("RPC_ENDPOINT_URL");
        env::remove_var("WATCHED_ADDRESS");
        env::remove_var("TOKEN_CONTRACT_ADDRESS");
        env::remove_var("LOOKBACK_BLOCKS");
        env::remove_var("SCAN_BATCH_SIZE");
        env::remove_var("EXPORT_RUN_HOUR_UTC");
        env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values() {
        env::set_var("LOOKBACK_BLOCKS", "not-a-number");

        let mut config = AppConfig::default();
        let result = config.apply_env_overrides();

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidValue { .. }));

        env::remove_var("LOOKBACK_BLOCKS");
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        let config_content = r#"
[rpc]
endpoint = "https://custom-rpc.example.org/"
timeout_seconds = 45

[scan]
watched_address = "0xf977814e90da44bfa03b6295a0616a897441acec"
token_contract_address = "0xdac17f958d2ee523a2206206994597c13d831ec7"
lookback_blocks = 14400
batch_size = 2000
token_decimals = 6

[export]
output_dir = "/var/exports"
run_hour_utc = 3

[logging]
level = "warn"
format = "json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, config_content.as_bytes()).unwrap();

        env::set_var("CONFIG_FILE", temp_file.path().to_str().unwrap());

        let config = AppConfig::load_from_file().unwrap();

        assert_eq!(config.rpc.endpoint, "https://custom-rpc.example.org/");
        assert_eq!(config.rpc.timeout_seconds, 45);
        assert_eq!(config.scan.lookback_blocks, 14_400);
        assert_eq!(config.scan.batch_size, 2_000);
        assert_eq!(config.export.output_dir, "/var/exports");
        assert_eq!(config.export.run_hour_utc, 3);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());

        env::remove_var("CONFIG_FILE");
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = AppConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[rpc]"));
        assert!(sample.contains("[scan]"));
        assert!(sample.contains("[export]"));
        assert!(sample.contains("[logging]"));
    }

    #[test]
    fn test_address_format_validation() {
        assert!(validate_address_format("0xdac17f958d2ee523a2206206994597c13d831ec7").is_ok());
        assert!(validate_address_format("dac17f958d2ee523a2206206994597c13d831ec7").is_err());
        assert!(validate_address_format("0xdac17f958d2ee523a2206206994597c13d831ec").is_err());
        assert!(validate_address_format("0xzac17f958d2ee523a2206206994597c13d831ec7").is_err());
    }
}
