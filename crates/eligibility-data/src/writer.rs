//! Output dataset writing.
//!
//! Both datasets are always written with a header, even when they hold no
//! rows. The unified dataset uses the fixed canonical columns; the dropped
//! dataset uses the union of the dropped records' columns.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use eligibility_core::error::{IngestError, Result};
use eligibility_core::models::{CanonicalRecord, DroppedRecord, OUTPUT_COLUMNS, PARTNER_CODE_COLUMN};
use tracing::debug;

pub const UNIFIED_FILE_NAME: &str = "unified_eligibility.csv";
pub const DROPPED_FILE_NAME: &str = "dropped_rows.csv";

// ── DatasetSink ───────────────────────────────────────────────────────────────

/// Destination for the two combined output datasets.
pub trait DatasetSink {
    fn write_unified(&mut self, records: &[CanonicalRecord]) -> Result<()>;
    fn write_dropped(&mut self, records: &[DroppedRecord]) -> Result<()>;
}

/// [`DatasetSink`] writing delimited files into an output directory.
#[derive(Debug, Clone)]
pub struct CsvDatasetWriter {
    output_dir: PathBuf,
    delimiter: u8,
}

impl CsvDatasetWriter {
    pub fn new(output_dir: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            output_dir: output_dir.into(),
            delimiter,
        }
    }

    pub fn unified_path(&self) -> PathBuf {
        self.output_dir.join(UNIFIED_FILE_NAME)
    }

    pub fn dropped_path(&self) -> PathBuf {
        self.output_dir.join(DROPPED_FILE_NAME)
    }

    fn create(&self, path: &Path) -> Result<std::fs::File> {
        std::fs::File::create(path).map_err(|source| IngestError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DatasetSink for CsvDatasetWriter {
    fn write_unified(&mut self, records: &[CanonicalRecord]) -> Result<()> {
        let path = self.unified_path();
        write_unified(self.create(&path)?, records, self.delimiter)?;
        debug!("Wrote {} unified rows to {}", records.len(), path.display());
        Ok(())
    }

    fn write_dropped(&mut self, records: &[DroppedRecord]) -> Result<()> {
        let path = self.dropped_path();
        write_dropped(self.create(&path)?, records, self.delimiter)?;
        debug!("Wrote {} dropped rows to {}", records.len(), path.display());
        Ok(())
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Write accepted records under the canonical header.
pub fn write_unified<W: Write>(out: W, records: &[CanonicalRecord], delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(out);

    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write dropped records under the union of their columns.
pub fn write_dropped<W: Write>(out: W, records: &[DroppedRecord], delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(out);

    let header = dropped_header(records);
    writer.write_record(&header)?;
    for record in records {
        let cells = header.iter().map(|col| record.get(col).unwrap_or(""));
        writer.write_record(cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Column order of the dropped dataset.
///
/// Columns appear in first-seen order across all records with
/// `partner_code` last. Without records this is the canonical header.
pub fn dropped_header(records: &[DroppedRecord]) -> Vec<String> {
    if records.is_empty() {
        return OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect();
    }

    let mut header: Vec<String> = Vec::new();
    for column in records.iter().flat_map(|r| r.columns()) {
        if column != PARTNER_CODE_COLUMN && !header.iter().any(|h| h == column) {
            header.push(column.to_string());
        }
    }
    header.push(PARTNER_CODE_COLUMN.to_string());
    header
}

// ── Tests ─────────────────────────────────────────────────────────────────────
