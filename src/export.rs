use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::logging::MetricsLogger;
use crate::models::ExportRecord;

/// Dated CSV writer boundary. Accepts ordered records and persists them with
/// a header row in the fixed column order Date, TxHash, Destination, Amount,
/// Memo.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// File name for a given UTC calendar date, `transactions_<YYYY-MM-DD>.csv`
    pub fn dated_file_name(date: NaiveDate) -> String {
        format!("transactions_{}.csv", date.format("%Y-%m-%d"))
    }

    /// Persist the records to `<output_dir>/<file_name>` in the order given.
    /// Either every row lands on disk or the run fails with the cause.
    pub fn export(
        &self,
        records: &[ExportRecord],
        file_name: &str,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);

        // Header written explicitly so an empty run still produces a valid
        // artifact with the fixed column order
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&path)?;
        writer.write_record(["Date", "TxHash", "Destination", "Amount", "Memo"])?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        MetricsLogger::log_export_written(&path.to_string_lossy(), records.len());
        Ok(path)
    }
}
