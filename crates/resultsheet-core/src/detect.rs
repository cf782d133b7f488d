//! Answer format detection.

use serde::{Deserialize, Serialize};

use crate::model::Assessment;

/// Whether an assessment's answers can be scored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerFormat {
    /// At least one answer carries a question category.
    Scoreable,
    /// Legacy or incomplete records with no categorized answers. These are
    /// scored as zero rather than rejected.
    Unscoreable,
}

/// Classify an assessment's answer set.
pub fn detect(assessment: &Assessment) -> AnswerFormat {
    if assessment.answers.iter().any(|a| a.category.is_some()) {
        AnswerFormat::Scoreable
    } else {
        AnswerFormat::Unscoreable
    }
}
