//! Delimited partner file loading.
//!
//! Reads a partner's file into a [`RawTable`] with every value kept as text.
//! Empty cells become `None`; rows wider than the header are skipped and
//! rows narrower than the header are padded with `None`.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use eligibility_core::error::{IngestError, Result};
use eligibility_core::models::{RawRow, RawTable};
use tracing::debug;

// ── RowSource ─────────────────────────────────────────────────────────────────

/// Anything that can produce a partner's raw table from `(path, delimiter)`.
pub trait RowSource {
    fn read_table(&self, path: &Path, delimiter: u8) -> Result<RawTable>;
}

/// [`RowSource`] backed by delimited files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRowSource;

impl RowSource for CsvRowSource {
    fn read_table(&self, path: &Path, delimiter: u8) -> Result<RawTable> {
        read_delimited_file(path, delimiter)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open `path` and parse it as a headed, `delimiter`-separated file.
pub fn read_delimited_file(path: &Path, delimiter: u8) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_delimited(file, delimiter, path)
}

/// Parse delimited text from any reader. `origin` is used for diagnostics.
pub fn parse_delimited<R: Read>(input: R, delimiter: u8, origin: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::EmptyFile(origin.to_path_buf()));
    }
    let columns = dedupe_headers(&headers);
    let width = columns.len();

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > width {
            debug!(
                "Skipping row {} in {}: {} fields, header has {}",
                index + 1,
                origin.display(),
                record.len(),
                width
            );
            skipped_rows += 1;
            continue;
        }
        rows.push(to_raw_row(&record, width));
    }

    debug!(
        "File {}: {} columns, {} rows, {} skipped",
        origin.display(),
        width,
        rows.len(),
        skipped_rows
    );

    Ok(RawTable {
        columns,
        rows,
        skipped_rows,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn to_raw_row(record: &StringRecord, width: usize) -> RawRow {
    (0..width)
        .map(|idx| record.get(idx).filter(|v| !v.is_empty()))
        .collect()
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column is
/// addressable by name.
fn dedupe_headers(headers: &StringRecord) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    for name in headers.iter() {
        let mut candidate = name.to_string();
        let mut n = 0;
        while columns.contains(&candidate) {
            n += 1;
            candidate = format!("{}.{}", name, n);
        }
        columns.push(candidate);
    }
    columns
}

// ── Tests ─────────────────────────────────────────────────────────────────────
