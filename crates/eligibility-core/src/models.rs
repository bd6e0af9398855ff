use serde::{Deserialize, Serialize};
use std::fmt;

// ── Canonical schema ──────────────────────────────────────────────────────────

/// One of the six canonical input fields every partner is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    ExternalId,
    FirstName,
    LastName,
    Dob,
    Email,
    Phone,
}

impl CanonicalField {
    /// All canonical input fields in output column order.
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::ExternalId,
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Dob,
        CanonicalField::Email,
        CanonicalField::Phone,
    ];

    /// Column name used in mappings and output headers.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::ExternalId => "external_id",
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::Dob => "dob",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
        }
    }

    /// Resolve a column name to a canonical field, if it is one.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance column stamped on every accepted and dropped record.
pub const PARTNER_CODE_COLUMN: &str = "partner_code";

/// Header of the unified output dataset (and of an empty dropped dataset).
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "external_id",
    "first_name",
    "last_name",
    "dob",
    "email",
    "phone",
    PARTNER_CODE_COLUMN,
];

// ── Raw input ─────────────────────────────────────────────────────────────────

/// A single data row as read from a partner file.
///
/// Values are positionally aligned with the owning [`RawTable`]'s columns.
/// Empty cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    values: Vec<Option<String>>,
}

impl RawRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at column position `idx`; `None` when empty or out of range.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Option<S>> for RawRow {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|v| v.map(Into::into)).collect())
    }
}

/// A partner file loaded into memory: header plus data rows, all text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names in file order.
    pub columns: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<RawRow>,
    /// Number of malformed rows the reader skipped.
    pub skipped_rows: usize,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            columns,
            rows,
            skipped_rows: 0,
        }
    }

    /// Position of `column` in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }
}

// ── Standardized output ───────────────────────────────────────────────────────

/// An accepted row in the canonical shape shared by all partners.
///
/// Field order matches [`OUTPUT_COLUMNS`]; absent values serialize as empty
/// cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Partner-issued member identifier. Never blank.
    pub external_id: String,
    /// Title-cased given name.
    pub first_name: Option<String>,
    /// Title-cased family name.
    pub last_name: Option<String>,
    /// Date of birth as `YYYY-MM-DD`.
    pub dob: Option<String>,
    /// Lower-cased e-mail address.
    pub email: Option<String>,
    /// Phone number as `AAA-BBB-CCCC`.
    pub phone: Option<String>,
    /// Code of the partner this record came from.
    pub partner_code: String,
}

impl CanonicalRecord {
    /// Value of a canonical field by enum key.
    pub fn field(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::ExternalId => Some(self.external_id.as_str()),
            CanonicalField::FirstName => self.first_name.as_deref(),
            CanonicalField::LastName => self.last_name.as_deref(),
            CanonicalField::Dob => self.dob.as_deref(),
            CanonicalField::Email => self.email.as_deref(),
            CanonicalField::Phone => self.phone.as_deref(),
        }
    }

    /// The record as output cells in [`OUTPUT_COLUMNS`] order.
    pub fn to_cells(&self) -> [Option<&str>; 7] {
        let [id, first, last, dob, email, phone] = CanonicalField::ALL.map(|f| self.field(f));
        [id, first, last, dob, email, phone, Some(self.partner_code.as_str())]
    }
}

/// A row rejected for lacking an identifier, kept verbatim for audit.
///
/// `fields` holds every post-rename column of the source row in order, the
/// canonical fields included, with `partner_code` last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub partner_code: String,
    pub fields: Vec<(String, Option<String>)>,
}

impl DroppedRecord {
    /// Look up a column's value; `None` when absent or not present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Column names in record order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}
