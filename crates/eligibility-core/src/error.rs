use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the eligibility ingest crates.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited file could not be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A partner file contained no header row at all.
    #[error("File has no header row: {0}")]
    EmptyFile(PathBuf),

    /// A delimiter string was not exactly one byte long.
    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(String),

    /// The partner configuration document could not be parsed.
    #[error("Failed to parse partner configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the eligibility crates.
pub type Result<T> = std::result::Result<T, IngestError>;
