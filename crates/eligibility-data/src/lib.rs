//! Data layer for the eligibility ingest pipeline.
//!
//! Reads partner files into raw tables, classifies and standardizes their
//! rows, and writes the unified and dropped-row datasets.

pub mod classifier;
pub mod reader;
pub mod standardizer;
pub mod writer;

pub use eligibility_core as core;
