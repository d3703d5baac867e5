use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;
use crate::logging::{LogContext, MetricsLogger};
use crate::models::RawTransferEvent;

/// ERC-20 Transfer event signature: Transfer(address indexed from, address indexed to, uint256 value)
pub const TRANSFER_EVENT_SIGNATURE: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    // A null result must stay distinguishable from a missing result field:
    // null deserializes to Some(Value::Null), absent to None.
    #[serde(default, deserialize_with = "deserialize_nullable_result")]
    result: Option<Value>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

fn deserialize_nullable_result<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Transaction-level detail, fetched per matching event to reach the calldata
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDetail {
    pub hash: String,
    /// Raw calldata payload; "0x" marks an empty data field
    pub input: String,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct LogFilter {
    #[serde(rename = "fromBlock")]
    from_block: String,
    #[serde(rename = "toBlock")]
    to_block: String,
    address: String,
    topics: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct EthLog {
    topics: Vec<String>,
    data: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "logIndex")]
    log_index: String,
}

/// Thin JSON-RPC gateway over the remote ledger node. No internal retry;
/// callers decide what a failed call means for the enclosing batch or event.
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
}

impl RpcClient {
    pub fn new(endpoint: String) -> Self {
        Self::new_with_timeout(endpoint, 30)
    }

    pub fn new_with_timeout(endpoint: String, timeout_seconds: u64) -> Self {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", serde_json::json!(endpoint))
            .with_metadata("timeout_seconds", serde_json::json!(timeout_seconds));
        context.info("Initializing RPC client");

        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_seconds))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
        }
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            MetricsLogger::log_rpc_call(method, false);
            return Err(RpcError::InvalidResponse(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let rpc_response: JsonRpcResponse = response.json().await?;

        if let Some(error) = rpc_response.error {
            MetricsLogger::log_rpc_call(method, false);
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        MetricsLogger::log_rpc_call(method, true);
        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("No result in response".to_string()))
    }

    /// Current chain height via eth_blockNumber
    pub async fn get_latest_block_number(&self) -> Result<u64, RpcError> {
        let result = self.make_request("eth_blockNumber", vec![]).await?;

        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;

        parse_hex_to_u64(hex_string)
    }

    /// Full transaction lookup via eth_getTransactionByHash
    pub async fn get_transaction(&self, hash: &str) -> Result<TransactionDetail, RpcError> {
        let params = vec![Value::String(hash.to_string())];
        let result = self.make_request("eth_getTransactionByHash", params).await?;

        if result.is_null() {
            return Err(RpcError::TransactionNotFound {
                hash: hash.to_string(),
            });
        }

        serde_json::from_value(result).map_err(RpcError::Json)
    }

    /// Block timestamp lookup via eth_getBlockByNumber (transaction bodies excluded)
    pub async fn get_block_timestamp(&self, block_number: u64) -> Result<u64, RpcError> {
        let params = vec![
            Value::String(format!("0x{:x}", block_number)),
            Value::Bool(false),
        ];
        let result = self.make_request("eth_getBlockByNumber", params).await?;

        if result.is_null() {
            return Err(RpcError::BlockNotFound { block_number });
        }

        let header: BlockHeader = serde_json::from_value(result).map_err(RpcError::Json)?;
        parse_hex_to_u64(&header.timestamp)
    }

    /// Transfer logs emitted by `contract` with `from_address` as sender,
    /// over the inclusive block range, via eth_getLogs
    pub async fn get_transfer_logs(
        &self,
        contract: &str,
        from_address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawTransferEvent>, RpcError> {
        let filter = LogFilter {
            from_block: format!("0x{:x}", from_block),
            to_block: format!("0x{:x}", to_block),
            address: contract.to_string(),
            topics: vec![
                Some(TRANSFER_EVENT_SIGNATURE.to_string()),
                Some(address_to_topic(from_address)),
            ],
        };

        let params = vec![serde_json::to_value(filter)?];
        let result = self.make_request("eth_getLogs", params).await?;

        let eth_logs: Vec<EthLog> = serde_json::from_value(result)?;

        let mut events = Vec::with_capacity(eth_logs.len());
        for eth_log in eth_logs {
            events.push(decode_transfer_log(eth_log)?);
        }
        Ok(events)
    }
}

fn decode_transfer_log(log: EthLog) -> Result<RawTransferEvent, RpcError> {
    // Transfer logs carry 3 topics: [signature, from, to]
    if log.topics.len() != 3 {
        return Err(RpcError::InvalidResponse(format!(
            "Expected 3 topics in transfer log, got {}",
            log.topics.len()
        )));
    }

    Ok(RawTransferEvent {
        block_number: parse_hex_to_u64(&log.block_number)?,
        log_index: parse_hex_to_u32(&log.log_index)?,
        transaction_hash: log.transaction_hash,
        from_address: extract_address_from_topic(&log.topics[1])?,
        to_address: extract_address_from_topic(&log.topics[2])?,
        raw_amount: parse_hex_to_u128(&log.data)?,
    })
}

/// Left-pad an address into the 32-byte topic form used by indexed filters
fn address_to_topic(address: &str) -> String {
    let hex_part = address.strip_prefix("0x").unwrap_or(address);
    format!("0x{:0>64}", hex_part.to_lowercase())
}

/// Extract the address from a 32-byte topic (last 20 bytes)
fn extract_address_from_topic(topic: &str) -> Result<String, RpcError> {
    let hex_part = topic.strip_prefix("0x").unwrap_or(topic);

    if hex_part.len() != 64 {
        return Err(RpcError::InvalidResponse(format!(
            "Topic should be 64 characters, got {}",
            hex_part.len()
        )));
    }

    Ok(format!("0x{}", hex_part[24..64].to_lowercase()))
}

fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u64::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex to u64: {}", e)))
}

fn parse_hex_to_u32(hex_str: &str) -> Result<u32, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u32::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex to u32: {}", e)))
}

fn parse_hex_to_u128(hex_str: &str) -> Result<u128, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u128::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex to u128: {}", e)))
}
