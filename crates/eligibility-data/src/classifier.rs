use std::fmt;

/// Outcome of classifying one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Accepted,
    Dropped,
}

impl fmt::Display for RowClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowClass::Accepted => f.write_str("accepted"),
            RowClass::Dropped => f.write_str("dropped"),
        }
    }
}

/// Decides whether a canonically-named row is accepted or dropped.
///
/// Acceptance depends on `external_id` alone: it must be present and
/// non-blank after trimming. Every other field is ignored here, so a row with
/// an unparseable `dob` or malformed phone is still accepted.
pub struct RowClassifier;

impl RowClassifier {
    pub fn classify(external_id: Option<&str>) -> RowClass {
        match external_id {
            Some(id) if !id.trim().is_empty() => RowClass::Accepted,
            _ => RowClass::Dropped,
        }
    }
}
