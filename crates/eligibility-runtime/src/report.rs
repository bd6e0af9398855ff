//! Run results: combined datasets, per-partner summaries and the preview
//! table printed after a run.

use eligibility_core::error::Result;
use eligibility_core::models::{CanonicalRecord, DroppedRecord, OUTPUT_COLUMNS};
use eligibility_data::writer::DatasetSink;
use serde::Serialize;

// ── Public types ──────────────────────────────────────────────────────────────

/// How a partner's ingest ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    /// The file was read and every row classified.
    Processed,
    /// The file could not be read; the partner contributed no rows.
    ReadFailed,
}

/// Per-partner counts collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerSummary {
    pub partner_name: String,
    pub partner_code: String,
    pub status: PartnerStatus,
    pub accepted: usize,
    pub dropped: usize,
    /// Malformed rows the reader skipped before standardization.
    pub skipped: usize,
    /// The mapped identifier column was not in the partner's header.
    pub missing_id_column: bool,
}

/// The combined output of an ingest run.
///
/// `unified` and `dropped` are concatenated in partner order and are always
/// present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub unified: Vec<CanonicalRecord>,
    pub dropped: Vec<DroppedRecord>,
    pub partners: Vec<PartnerSummary>,
}

impl IngestReport {
    /// Hand both datasets to `sink`.
    pub fn write_to<S: DatasetSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.write_unified(&self.unified)?;
        sink.write_dropped(&self.dropped)?;
        Ok(())
    }

    /// Partners whose file could not be read.
    pub fn failed_partners(&self) -> impl Iterator<Item = &PartnerSummary> {
        self.partners
            .iter()
            .filter(|p| p.status == PartnerStatus::ReadFailed)
    }
}

// ── Preview ───────────────────────────────────────────────────────────────────

/// Render up to `limit` unified records as a right-aligned text table.
///
/// Absent values print as `NaN`. Returns an empty string when `limit` is 0.
pub fn format_preview(records: &[CanonicalRecord], limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }

    let rows: Vec<[&str; 7]> = records
        .iter()
        .take(limit)
        .map(|r| r.to_cells().map(|cell| cell.unwrap_or("NaN")))
        .collect();

    let mut widths: [usize; 7] = OUTPUT_COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &OUTPUT_COLUMNS, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str; 7], widths: &[usize; 7]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
        .collect();
    out.push_str(&line.join(" "));
    out.push('\n');
}

// ── Tests ─────────────────────────────────────────────────────────────────────
