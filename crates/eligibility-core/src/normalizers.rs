//! Field-level normalizers applied to accepted rows.
//!
//! Every function here is total: malformed or missing input degrades to
//! `None`, never to an error. Each normalizer is idempotent on its own output.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

/// Tokens that stand in for "no value" in partner exports. Matched with
/// exact case, so a real name such as `Na` survives.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Date-time patterns whose date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only patterns. `%y` must precede `%Y` for the same layout so that
/// two-digit years are not read as years 0-99.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Trim `value` and return it unless it is blank or a null placeholder.
pub fn clean_text(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || is_null_token(trimmed) {
        return None;
    }
    Some(trimmed)
}

/// `true` for placeholder strings such as `nan`, `NULL` or `N/A`.
pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value.trim())
}

// ── Names and e-mail ──────────────────────────────────────────────────────────

/// Title-case a personal name.
///
/// The first letter of every whitespace-separated token is upper-cased and
/// the remaining letters lower-cased; inner whitespace is left as is.
pub fn normalize_name(value: Option<&str>) -> Option<String> {
    let text = clean_text(value)?;

    let mut out = String::with_capacity(text.len());
    let mut at_token_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_token_start = true;
            out.push(ch);
        } else if at_token_start {
            at_token_start = false;
            // `ß` upper-cases to `SS`; only the first char stays capital.
            let mut upper = ch.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    Some(out).filter(|name| !is_null_token(name))
}

/// Lower-case an e-mail address.
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    clean_text(value)
        .map(str::to_lowercase)
        .filter(|email| !is_null_token(email))
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse heterogeneous date text into an ISO `YYYY-MM-DD` string.
///
/// Unparseable input yields `None`.
pub fn parse_date(value: Option<&str>) -> Option<String> {
    let text = clean_text(value)?;
    let date = parse_naive_date(text);
    if date.is_none() {
        debug!("parse_date: could not parse date \"{}\"", text);
    }
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Years below this are a pattern reading a day or month as `%Y`.
const MIN_YEAR: i32 = 1000;

fn parse_naive_date(s: &str) -> Option<NaiveDate> {
    parse_any_format(s).filter(|d| d.year() >= MIN_YEAR)
}

fn parse_any_format(s: &str) -> Option<NaiveDate> {
    // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
    let normalised = match s.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.date_naive());
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact_date(s);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }

    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .filter(|d| d.year() >= MIN_YEAR)
    })
}

/// `YYYYMMDD`
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    let year = s.get(0..4)?.parse().ok()?;
    let month = s.get(4..6)?.parse().ok()?;
    let day = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ── Phone numbers ─────────────────────────────────────────────────────────────

fn non_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\D").expect("regex is valid"))
}

/// Format a phone number as `AAA-BBB-CCCC`.
///
/// All non-digit characters are stripped first; anything other than exactly
/// ten remaining digits yields `None`. Digits from any script count, so the
/// grouping works on chars rather than bytes.
pub fn format_phone(value: Option<&str>) -> Option<String> {
    let text = value?;
    let digits: Vec<char> = non_digit_re().replace_all(text, "").chars().collect();
    if digits.len() != 10 {
        return None;
    }
    let group = |range: std::ops::Range<usize>| digits[range].iter().collect::<String>();
    Some(format!("{}-{}-{}", group(0..3), group(3..6), group(6..10)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
