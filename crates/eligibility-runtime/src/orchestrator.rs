//! Sequential ingest orchestrator.
//!
//! Walks the partner registry in declaration order, reads each partner's
//! file through a [`RowSource`], standardizes it and accumulates the results
//! into an [`IngestReport`]. A partner whose file cannot be read contributes
//! nothing; the run itself never fails because of one partner.

use eligibility_core::error::IngestError;
use eligibility_core::models::RawTable;
use eligibility_core::partners::{PartnerConfig, PartnerRegistry};
use eligibility_data::reader::RowSource;
use eligibility_data::standardizer::{PartnerStandardizer, StandardizedPartner};
use tracing::{debug, error, info, warn};

use crate::report::{IngestReport, PartnerStatus, PartnerSummary};

// ── Public types ──────────────────────────────────────────────────────────────

/// Result of ingesting a single partner.
#[derive(Debug)]
pub enum PartnerOutcome {
    /// The file was read and standardized.
    Standardized {
        result: StandardizedPartner,
        skipped_rows: usize,
        missing_id_column: bool,
    },
    /// The file could not be read.
    ReadFailed { reason: IngestError },
}

// ── IngestOrchestrator ────────────────────────────────────────────────────────

/// Drives standardization across every configured partner.
pub struct IngestOrchestrator<S> {
    registry: PartnerRegistry,
    source: S,
}

impl<S: RowSource> IngestOrchestrator<S> {
    pub fn new(registry: PartnerRegistry, source: S) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &PartnerRegistry {
        &self.registry
    }

    /// Process every partner and return the combined datasets.
    pub fn run(&self) -> IngestReport {
        let mut report = IngestReport::default();

        for (name, conf) in self.registry.iter() {
            info!("Processing partner: {}", name);
            let outcome = self.ingest_partner(name, conf);
            absorb(&mut report, name, conf, outcome);
        }

        info!(
            "Ingest finished: {} partner(s), {} accepted row(s), {} dropped row(s)",
            report.partners.len(),
            report.unified.len(),
            report.dropped.len()
        );
        report
    }

    /// Read and standardize one partner.
    pub fn ingest_partner(&self, name: &str, conf: &PartnerConfig) -> PartnerOutcome {
        let table = match self.read_partner(name, conf) {
            Ok(table) => table,
            Err(reason) => return PartnerOutcome::ReadFailed { reason },
        };

        let missing_id_column = match conf.id_source_column() {
            Some(id_col) if !table.has_column(id_col) => {
                warn!(
                    "Expected id column '{}' not found in {}. Proceeding, but all rows will be considered missing id.",
                    id_col,
                    conf.file_path.display()
                );
                true
            }
            _ => false,
        };

        let result = PartnerStandardizer::new(conf).standardize(&table);
        debug!(
            "{}: {} accepted, {} dropped",
            name,
            result.accepted_count(),
            result.dropped_count()
        );

        PartnerOutcome::Standardized {
            result,
            skipped_rows: table.skipped_rows,
            missing_id_column,
        }
    }

    fn read_partner(&self, name: &str, conf: &PartnerConfig) -> Result<RawTable, IngestError> {
        let delimiter = conf.delimiter_byte()?;
        info!(
            "Reading {} from {} using delimiter '{}'",
            name,
            conf.file_path.display(),
            conf.delimiter
        );
        self.source.read_table(&conf.file_path, delimiter)
    }
}

/// Fold one partner's outcome into the run report.
fn absorb(report: &mut IngestReport, name: &str, conf: &PartnerConfig, outcome: PartnerOutcome) {
    let summary = match outcome {
        PartnerOutcome::Standardized {
            result,
            skipped_rows,
            missing_id_column,
        } => {
            let summary = PartnerSummary {
                partner_name: name.to_string(),
                partner_code: conf.partner_code.clone(),
                status: PartnerStatus::Processed,
                accepted: result.accepted_count(),
                dropped: result.dropped_count(),
                skipped: skipped_rows,
                missing_id_column,
            };
            report.unified.extend(result.accepted);
            report.dropped.extend(result.dropped);
            summary
        }
        PartnerOutcome::ReadFailed { reason } => {
            error!("Failed to read {}: {}", conf.file_path.display(), reason);
            PartnerSummary {
                partner_name: name.to_string(),
                partner_code: conf.partner_code.clone(),
                status: PartnerStatus::ReadFailed,
                accepted: 0,
                dropped: 0,
                skipped: 0,
                missing_id_column: false,
            }
        }
    };
    report.partners.push(summary);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use eligibility_core::models::{RawRow, OUTPUT_COLUMNS};
    use eligibility_core::partners::ColumnMapping;
    use eligibility_data::reader::CsvRowSource;
    use eligibility_data::writer::{CsvDatasetWriter, DatasetSink};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// In-memory source keyed by file path; unknown paths fail like a
    /// missing file.
    #[derive(Default)]
    struct MemorySource {
        tables: HashMap<PathBuf, RawTable>,
    }

    impl MemorySource {
        fn with(mut self, path: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
            let table = RawTable::new(
                columns.iter().map(|c| c.to_string()).collect(),
                rows.iter()
                    .map(|r| r.iter().copied().collect::<RawRow>())
                    .collect(),
            );
            self.tables.insert(PathBuf::from(path), table);
            self
        }
    }

    impl RowSource for MemorySource {
        fn read_table(&self, path: &Path, _delimiter: u8) -> eligibility_core::Result<RawTable> {
            self.tables
                .get(path)
                .cloned()
                .ok_or_else(|| IngestError::FileRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
        }
    }

    fn partner(code: &str, path: &str, mapping: &[(&str, &str)]) -> PartnerConfig {
        PartnerConfig {
            partner_code: code.to_string(),
            column_mapping: ColumnMapping::new(mapping.iter().copied()),
            file_path: PathBuf::from(path),
            delimiter: ",".to_string(),
        }
    }

    fn registry(partners: Vec<(&str, PartnerConfig)>) -> PartnerRegistry {
        PartnerRegistry::new(
            partners
                .into_iter()
                .map(|(name, conf)| (name.to_string(), conf))
                .collect(),
        )
        .unwrap()
    }

    fn two_partner_setup() -> (PartnerRegistry, MemorySource) {
        let reg = registry(vec![
            (
                "acme",
                partner(
                    "ACME",
                    "acme.csv",
                    &[("id", "external_id"), ("first", "first_name"), ("tel", "phone")],
                ),
            ),
            (
                "zeta",
                partner(
                    "ZETA",
                    "zeta.txt",
                    &[("MemberID", "external_id"), ("Email", "email"), ("DOB", "dob")],
                ),
            ),
        ]);
        let source = MemorySource::default()
            .with(
                "acme.csv",
                &["id", "first", "tel"],
                &[
                    &[Some("A1"), Some("ann"), Some("(555) 123-4567")],
                    &[None, Some("bob"), Some("5551112222")],
                    &[Some("A3"), Some("cy"), Some("12345")],
                ],
            )
            .with(
                "zeta.txt",
                &["MemberID", "Email", "DOB"],
                &[
                    &[Some("Z1"), Some("Z1@X.COM"), Some("2020-01-15")],
                    &[Some("Z2"), None, Some("not-a-date")],
                    &[Some("   "), Some("q@x.com"), Some("1990-02-03")],
                ],
            );
        (reg, source)
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_two_partners_end_to_end_counts_and_codes() {
        let (reg, source) = two_partner_setup();
        let report = IngestOrchestrator::new(reg, source).run();

        assert_eq!(report.unified.len(), 4);
        assert_eq!(report.dropped.len(), 2);

        let ids: Vec<(&str, &str)> = report
            .unified
            .iter()
            .map(|r| (r.external_id.as_str(), r.partner_code.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![("A1", "ACME"), ("A3", "ACME"), ("Z1", "ZETA"), ("Z2", "ZETA")]
        );
        let dropped_codes: Vec<&str> = report.dropped.iter().map(|d| d.partner_code.as_str()).collect();
        assert_eq!(dropped_codes, vec!["ACME", "ZETA"]);
        assert_eq!(report.dropped[0].get("first_name"), Some("bob"));
    }

    #[test]
    fn test_fields_normalized_in_unified_output() {
        let (reg, source) = two_partner_setup();
        let report = IngestOrchestrator::new(reg, source).run();

        let a1 = &report.unified[0];
        assert_eq!(a1.first_name.as_deref(), Some("Ann"));
        assert_eq!(a1.phone.as_deref(), Some("555-123-4567"));
        assert!(report.unified[1].phone.is_none());

        let z1 = &report.unified[2];
        assert_eq!(z1.email.as_deref(), Some("z1@x.com"));
        assert_eq!(z1.dob.as_deref(), Some("2020-01-15"));
        assert!(report.unified[3].dob.is_none());
    }

    #[test]
    fn test_partner_summaries_in_registry_order() {
        let (reg, source) = two_partner_setup();
        let report = IngestOrchestrator::new(reg, source).run();

        assert_eq!(report.partners.len(), 2);
        assert_eq!(report.partners[0].partner_name, "acme");
        assert_eq!(report.partners[0].accepted, 2);
        assert_eq!(report.partners[0].dropped, 1);
        assert_eq!(report.partners[1].partner_code, "ZETA");
        assert_eq!(report.partners[1].status, PartnerStatus::Processed);
    }

    #[test]
    fn test_read_failure_contributes_nothing_and_run_continues() {
        let reg = registry(vec![
            ("ghost", partner("GHOST", "missing.csv", &[("id", "external_id")])),
            ("real", partner("REAL", "real.csv", &[("id", "external_id")])),
        ]);
        let source = MemorySource::default().with("real.csv", &["id"], &[&[Some("R1")]]);
        let report = IngestOrchestrator::new(reg, source).run();

        assert_eq!(report.unified.len(), 1);
        assert_eq!(report.unified[0].partner_code, "REAL");
        assert_eq!(report.partners[0].status, PartnerStatus::ReadFailed);
        assert_eq!(report.failed_partners().count(), 1);
    }

    #[test]
    fn test_bad_delimiter_fails_only_that_partner() {
        let mut piped = partner("PIPED", "piped.txt", &[("id", "external_id")]);
        piped.delimiter = "||".to_string();
        let reg = registry(vec![
            ("piped", piped),
            ("real", partner("REAL", "real.csv", &[("id", "external_id")])),
        ]);
        let source = MemorySource::default()
            .with("piped.txt", &["id"], &[&[Some("P1")]])
            .with("real.csv", &["id"], &[&[Some("R1")], &[Some("R2")]]);
        let report = IngestOrchestrator::new(reg, source).run();

        assert_eq!(report.unified.len(), 2);
        assert!(report.unified.iter().all(|r| r.partner_code == "REAL"));
        assert_eq!(report.partners[0].status, PartnerStatus::ReadFailed);
        assert_eq!(report.partners[1].status, PartnerStatus::Processed);
    }

    #[test]
    fn test_ingest_partner_returns_read_failed_outcome() {
        let reg = registry(vec![(
            "ghost",
            partner("GHOST", "missing.csv", &[("id", "external_id")]),
        )]);
        let orchestrator = IngestOrchestrator::new(reg, MemorySource::default());
        let (name, conf) = orchestrator.registry().iter().next().unwrap();

        let outcome = orchestrator.ingest_partner(name, conf);
        assert!(matches!(
            outcome,
            PartnerOutcome::ReadFailed {
                reason: IngestError::FileRead { .. }
            }
        ));
    }

    #[test]
    fn test_missing_id_column_drops_all_rows_and_is_flagged() {
        let reg = registry(vec![(
            "p",
            partner("P", "p.csv", &[("member_no", "external_id"), ("fn", "first_name")]),
        )]);
        let source = MemorySource::default().with(
            "p.csv",
            &["memberno", "fn"],
            &[&[Some("1"), Some("a")], &[Some("2"), Some("b")]],
        );
        let report = IngestOrchestrator::new(reg, source).run();

        assert!(report.unified.is_empty());
        assert_eq!(report.dropped.len(), 2);
        assert!(report.partners[0].missing_id_column);
        assert_eq!(report.dropped[1].get("memberno"), Some("2"));
    }

    #[test]
    fn test_zero_partners_yields_empty_datasets() {
        let reg = registry(Vec::new());
        let report = IngestOrchestrator::new(reg, MemorySource::default()).run();
        assert!(report.unified.is_empty());
        assert!(report.dropped.is_empty());
        assert!(report.partners.is_empty());
    }

    // ── run + CSV files on disk ───────────────────────────────────────────────

    #[test]
    fn test_files_end_to_end_with_csv_source_and_writer() {
        let dir = TempDir::new().unwrap();
        let acme_path = dir.path().join("acme.csv");
        let zeta_path = dir.path().join("zeta.txt");
        std::fs::write(
            &acme_path,
            "id,first,last,tel\nA1,joHN,DOE,(555) 123-4567\n,ann,lee,5551234567\nA3,cy,,+1-555-123-4567\n",
        )
        .unwrap();
        std::fs::write(
            &zeta_path,
            "MemberID|FName|DOB\nZ1|mary|01/15/2020\n  |pat|2001-02-03\nZ3|lou|garbage\n",
        )
        .unwrap();

        let mut zeta = partner(
            "ZETA",
            zeta_path.to_str().unwrap(),
            &[("MemberID", "external_id"), ("FName", "first_name"), ("DOB", "dob")],
        );
        zeta.delimiter = "|".to_string();
        let reg = registry(vec![
            (
                "acme",
                partner(
                    "ACME",
                    acme_path.to_str().unwrap(),
                    &[
                        ("id", "external_id"),
                        ("first", "first_name"),
                        ("last", "last_name"),
                        ("tel", "phone"),
                    ],
                ),
            ),
            ("zeta", zeta),
        ]);

        let report = IngestOrchestrator::new(reg, CsvRowSource).run();

        let out_dir = dir.path().join("output");
        std::fs::create_dir_all(&out_dir).unwrap();
        let mut writer = CsvDatasetWriter::new(&out_dir, b',');
        report.write_to(&mut writer).unwrap();

        let unified = std::fs::read_to_string(writer.unified_path()).unwrap();
        let lines: Vec<&str> = unified.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], OUTPUT_COLUMNS.join(","));
        assert_eq!(lines[1], "A1,John,Doe,,,555-123-4567,ACME");
        assert_eq!(lines[2], "A3,Cy,,,,,ACME");
        assert_eq!(lines[3], "Z1,Mary,,2020-01-15,,,ZETA");
        assert_eq!(lines[4], "Z3,Lou,,,,,ZETA");

        let dropped = std::fs::read_to_string(writer.dropped_path()).unwrap();
        let dropped_lines: Vec<&str> = dropped.lines().collect();
        assert_eq!(dropped_lines.len(), 3);
        assert_eq!(
            dropped_lines[0],
            "external_id,first_name,last_name,phone,dob,email,partner_code"
        );
        assert_eq!(dropped_lines[1], ",ann,lee,5551234567,,,ACME");
        assert_eq!(dropped_lines[2], "  ,pat,,,2001-02-03,,ZETA");
    }

    #[test]
    fn test_all_reads_failing_still_writes_headers() {
        let dir = TempDir::new().unwrap();
        let reg = registry(vec![(
            "ghost",
            partner(
                "GHOST",
                dir.path().join("absent.csv").to_str().unwrap(),
                &[("id", "external_id")],
            ),
        )]);

        let report = IngestOrchestrator::new(reg, CsvRowSource).run();
        let mut writer = CsvDatasetWriter::new(dir.path(), b',');
        writer.write_unified(&report.unified).unwrap();
        writer.write_dropped(&report.dropped).unwrap();

        let header = format!("{}\n", OUTPUT_COLUMNS.join(","));
        assert_eq!(std::fs::read_to_string(writer.unified_path()).unwrap(), header);
        assert_eq!(std::fs::read_to_string(writer.dropped_path()).unwrap(), header);
    }
}
