//! Per-partner standardization.
//!
//! Renames a partner's columns onto the canonical schema, classifies every
//! row, normalizes accepted rows into [`CanonicalRecord`]s and keeps dropped
//! rows verbatim (post-rename) for the audit dataset.

use eligibility_core::models::{
    CanonicalField, CanonicalRecord, DroppedRecord, RawRow, RawTable, PARTNER_CODE_COLUMN,
};
use eligibility_core::normalizers::{format_phone, normalize_email, normalize_name, parse_date};
use eligibility_core::partners::PartnerConfig;
use tracing::{debug, warn};

use crate::classifier::{RowClass, RowClassifier};

// ── Public types ──────────────────────────────────────────────────────────────

/// Accepted and dropped rows for one partner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardizedPartner {
    pub partner_code: String,
    pub accepted: Vec<CanonicalRecord>,
    pub dropped: Vec<DroppedRecord>,
}

impl StandardizedPartner {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Rows seen; always `accepted_count() + dropped_count()`.
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.dropped.len()
    }
}

/// The post-rename header of a partner table.
///
/// Each entry pairs an output column name with the raw row position it reads
/// from. Canonical fields the partner does not provide are absent from
/// `columns` and `None` in `canonical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedSchema {
    pub columns: Vec<(String, usize)>,
    canonical: [Option<usize>; 6],
}

impl RenamedSchema {
    /// Apply `config`'s column mapping to `raw_columns`.
    ///
    /// Unmapped columns keep their raw names. When several source columns
    /// land on the same name the first one in header order wins.
    pub fn from_columns(raw_columns: &[String], config: &PartnerConfig) -> Self {
        let mut columns: Vec<(String, usize)> = Vec::with_capacity(raw_columns.len());
        for (idx, raw) in raw_columns.iter().enumerate() {
            let name = config.column_mapping.target(raw).unwrap_or(raw.as_str());
            if columns.iter().any(|(existing, _)| existing == name) {
                debug!(
                    "{}: column '{}' also maps to '{}'; keeping the first",
                    config.partner_code, raw, name
                );
                continue;
            }
            columns.push((name.to_string(), idx));
        }

        let mut canonical = [None; 6];
        for (name, idx) in &columns {
            if let Some(field) = CanonicalField::from_column(name) {
                canonical[field as usize] = Some(*idx);
            }
        }

        Self { columns, canonical }
    }

    /// Raw row position of a canonical field, if the partner provides it.
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.canonical[field as usize]
    }

    /// Value of a canonical field in `row`.
    pub fn value<'r>(&self, row: &'r RawRow, field: CanonicalField) -> Option<&'r str> {
        self.index_of(field).and_then(|idx| row.get(idx))
    }
}

// ── PartnerStandardizer ───────────────────────────────────────────────────────

/// Turns one partner's raw table into accepted and dropped records.
pub struct PartnerStandardizer<'a> {
    config: &'a PartnerConfig,
}

impl<'a> PartnerStandardizer<'a> {
    pub fn new(config: &'a PartnerConfig) -> Self {
        Self { config }
    }

    /// Run the fixed rename → classify → normalize pipeline over `table`.
    ///
    /// Never fails: malformed values become `None`, rows without an
    /// identifier are dropped.
    pub fn standardize(&self, table: &RawTable) -> StandardizedPartner {
        let schema = RenamedSchema::from_columns(&table.columns, self.config);
        let partner_code = self.config.partner_code.clone();

        let mut accepted = Vec::new();
        let mut dropped = Vec::new();

        for row in &table.rows {
            match RowClassifier::classify(schema.value(row, CanonicalField::ExternalId)) {
                RowClass::Accepted => accepted.push(self.normalize_row(&schema, row)),
                RowClass::Dropped => dropped.push(self.retain_row(&schema, row)),
            }
        }

        if !dropped.is_empty() {
            warn!(
                "{} row(s) dropped for {} (missing external_id)",
                dropped.len(),
                partner_code
            );
        }

        StandardizedPartner {
            partner_code,
            accepted,
            dropped,
        }
    }

    fn normalize_row(&self, schema: &RenamedSchema, row: &RawRow) -> CanonicalRecord {
        let get = |field| schema.value(row, field);
        CanonicalRecord {
            external_id: get(CanonicalField::ExternalId)
                .unwrap_or_default()
                .to_string(),
            first_name: normalize_name(get(CanonicalField::FirstName)),
            last_name: normalize_name(get(CanonicalField::LastName)),
            dob: parse_date(get(CanonicalField::Dob)),
            email: normalize_email(get(CanonicalField::Email)),
            phone: format_phone(get(CanonicalField::Phone)),
            partner_code: self.config.partner_code.clone(),
        }
    }

    fn retain_row(&self, schema: &RenamedSchema, row: &RawRow) -> DroppedRecord {
        let mut fields: Vec<(String, Option<String>)> = schema
            .columns
            .iter()
            .filter(|(name, _)| name != PARTNER_CODE_COLUMN)
            .map(|(name, idx)| (name.clone(), row.get(*idx).map(str::to_string)))
            .collect();

        for field in CanonicalField::ALL {
            if schema.index_of(field).is_none() {
                fields.push((field.as_str().to_string(), None));
            }
        }
        fields.push((
            PARTNER_CODE_COLUMN.to_string(),
            Some(self.config.partner_code.clone()),
        ));

        DroppedRecord {
            partner_code: self.config.partner_code.clone(),
            fields,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
