use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use engine_logging::engine_info;

use crate::persist::PersistError;

pub const CONVERSION_LOG_FILENAME: &str = "encoding-conversions.log";

/// A text value that sanitization changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRecord {
    pub original: String,
    pub sanitized: String,
    pub context: String,
}

/// Collects every sanitization change made during one run.
#[derive(Debug, Default)]
pub struct ConversionAudit {
    records: Vec<ConversionRecord>,
}

impl ConversionAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ConversionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ConversionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append the pending records to `log_path` under a timestamped header and
    /// clear them. Returns `Ok(false)` without touching the file when nothing
    /// is pending.
    ///
    /// Records are kept if the write fails, so a later flush can retry.
    pub fn flush(&mut self, log_path: &Path) -> Result<bool, PersistError> {
        if self.records.is_empty() {
            return Ok(false);
        }

        let file = OpenOptions::new().create(true).append(true).open(log_path)?;
        let mut out = BufWriter::new(file);
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
        write!(out, "\n=== Conversion Log [{timestamp}] ===\n")?;
        for record in &self.records {
            writeln!(
                out,
                "  [{}] {:?} → {:?}",
                record.context, record.original, record.sanitized
            )?;
        }
        out.flush()?;

        engine_info!(
            "Logged {} conversions to {}",
            self.records.len(),
            log_path.display()
        );
        self.records.clear();
        Ok(true)
    }
}
