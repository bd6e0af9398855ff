//! Runtime orchestration layer for the eligibility ingest pipeline.
//!
//! Drives per-partner standardization in configuration order and collects
//! the combined datasets and per-partner summaries of a run.

pub mod orchestrator;
pub mod report;

pub use eligibility_core as core;
pub use eligibility_data as data;
