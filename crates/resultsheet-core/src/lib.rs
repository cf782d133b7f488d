//! resultsheet-core: Scheme registry, mark aggregation, and result sheets.
//!
//! This crate defines the scoring model and the pipeline that turns a batch
//! of candidate assessments into a fixed-column result sheet: format
//! detection, per-unit aggregation, weight normalization, and pass/fail
//! classification.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod scheme;
pub mod sheet;
