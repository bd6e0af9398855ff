//! Partner configuration: column mappings, file locations and delimiters.
//!
//! Loaded once from a JSON document whose top-level object maps partner
//! name to [`PartnerConfig`]. Declaration order is significant (it is the
//! processing and output order), so both the partner map and each column
//! mapping are deserialized into ordered vectors rather than hash maps.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{IngestError, Result};
use crate::models::CanonicalField;

fn default_delimiter() -> String {
    ",".to_string()
}

// ── ColumnMapping ─────────────────────────────────────────────────────────────

/// Ordered mapping of partner column name to canonical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<(String, String)>,
}

impl ColumnMapping {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Target name for a source column, if the column is mapped.
    pub fn target(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(from, _)| from == source)
            .map(|(_, to)| to.as_str())
    }

    /// First source column mapped onto `field`.
    pub fn source_for(&self, field: CanonicalField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, to)| to == field.as_str())
            .map(|(from, _)| from.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_ordered(deserializer).map(|entries| ColumnMapping { entries })
    }
}

// ── PartnerConfig ─────────────────────────────────────────────────────────────

/// Everything needed to ingest one partner's file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartnerConfig {
    /// Short code stamped on every record from this partner.
    pub partner_code: String,
    /// Partner column name → canonical column name.
    pub column_mapping: ColumnMapping,
    /// Location of the partner's delimited file.
    pub file_path: PathBuf,
    /// Single-character field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl PartnerConfig {
    /// The delimiter as a single byte for the CSV reader.
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.delimiter)
    }

    /// Source column the partner uses for `external_id`, if mapped.
    pub fn id_source_column(&self) -> Option<&str> {
        self.column_mapping.source_for(CanonicalField::ExternalId)
    }
}

/// Convert a one-byte delimiter string into the byte the CSV crate expects.
pub fn delimiter_byte(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [b] => Ok(*b),
        _ => Err(IngestError::InvalidDelimiter(delimiter.to_string())),
    }
}

// ── PartnerRegistry ───────────────────────────────────────────────────────────

/// Immutable, ordered set of partner configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerRegistry {
    partners: Vec<(String, PartnerConfig)>,
}

impl PartnerRegistry {
    /// Build a registry from `(partner_name, config)` pairs, validating them.
    pub fn new(partners: Vec<(String, PartnerConfig)>) -> Result<Self> {
        let registry = Self { partners };
        registry.validate()?;
        Ok(registry)
    }

    /// Parse and validate a registry from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        let partners: Vec<(String, PartnerConfig)> = deserialize_ordered(&mut de)?;
        de.end()?;
        Self::new(partners)
    }

    /// Load and validate a registry from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Partners in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PartnerConfig)> {
        self.partners.iter().map(|(name, conf)| (name.as_str(), conf))
    }

    pub fn get(&self, partner_name: &str) -> Option<&PartnerConfig> {
        self.partners
            .iter()
            .find(|(name, _)| name == partner_name)
            .map(|(_, conf)| conf)
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, conf) in &self.partners {
            if !seen.insert(name.as_str()) {
                return Err(IngestError::Config(format!(
                    "partner '{}' is declared more than once",
                    name
                )));
            }
            if conf.partner_code.trim().is_empty() {
                return Err(IngestError::Config(format!(
                    "partner '{}' has a blank partner_code",
                    name
                )));
            }
        }
        Ok(())
    }
}

// ── Ordered map deserialization ───────────────────────────────────────────────

/// Deserialize a map into a vector of entries, keeping source order.
fn deserialize_ordered<'de, D, V>(deserializer: D) -> std::result::Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor(PhantomData))
}
