pub mod event_scanner;
pub mod memo_decoder;
pub mod range_planner;
pub mod rpc_client;

pub use event_scanner::{EventScanner, ScanOutcome, ScanReport};
pub use memo_decoder::decode_memo;
pub use range_planner::{BatchRange, BlockWindow};
pub use rpc_client::{RpcClient, TransactionDetail, TRANSFER_EVENT_SIGNATURE};
