//! Shared building blocks for the eligibility ingest pipeline.
//!
//! Holds the canonical data model, the error taxonomy, the field
//! normalizers applied to accepted rows, partner configuration and CLI
//! settings.

pub mod error;
pub mod models;
pub mod normalizers;
pub mod partners;
pub mod settings;

pub use error::{IngestError, Result};
