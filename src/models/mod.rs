pub mod export_record;
pub mod transfer;

pub use export_record::ExportRecord;
pub use transfer::{format_base_units, EnrichedTransaction, RawTransferEvent};
