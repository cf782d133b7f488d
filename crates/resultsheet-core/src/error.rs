//! Error types for scheme resolution, configuration loading, and input
//! selection.
//!
//! Only batch-level failures live here. Answer-level and candidate-level
//! anomalies never surface as errors; they degrade to zero or partial scores
//! and are recorded as [`RejectedAnswer`](crate::aggregate::RejectedAnswer)s.

use thiserror::Error;

/// Errors that abort scoring of a whole batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The scheme id is not present in the registry.
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    /// The scheme resolved but defines no competency units, so the sheet
    /// would have no score columns.
    #[error("scheme '{0}' defines no competency units")]
    EmptyModuleList(String),
}

/// Errors found while loading a scheme configuration document.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemeConfigError {
    #[error("unsupported scheme configuration version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("scheme id must not be empty")]
    EmptySchemeId,

    #[error("scheme '{0}' is defined more than once")]
    DuplicateScheme(String),

    #[error("scheme '{scheme}' has a unit with an empty code")]
    EmptyUnitCode { scheme: String },

    #[error("scheme '{scheme}' defines unit '{code}' more than once")]
    DuplicateUnit { scheme: String, code: String },

    #[error("scheme '{scheme}', unit '{code}': {field} weight must be a non-negative number, got {value}")]
    InvalidWeight {
        scheme: String,
        code: String,
        field: &'static str,
        value: f64,
    },

    #[error("scheme '{scheme}': pass threshold must be within 0..=100, got {value}")]
    InvalidThreshold { scheme: String, value: f64 },
}

/// Errors selecting a batch out of a candidate document set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("no candidates found for batch '{0}'")]
    NotFound(String),

    #[error("no candidate has an assessment; cannot infer a batch")]
    NoAssessments,

    #[error("input holds {} batches ({}); choose one with --batch", .0.len(), .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// Why a bulk-import row was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("missing candidateId or aadhar")]
    MissingId,

    #[error("duplicate aadhar in upload: {0}")]
    DuplicateAadhar(String),
}

impl SheetError {
    /// Returns the scheme id the error refers to.
    pub fn scheme_id(&self) -> &str {
        match self {
            SheetError::UnknownScheme(id) | SheetError::EmptyModuleList(id) => id,
        }
    }
}
