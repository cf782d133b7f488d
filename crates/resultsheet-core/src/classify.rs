//! Pass/fail classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final result of a candidate's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    /// No completed, answered assessment for the batch.
    #[serde(rename = "Assessment Not Completed")]
    NotCompleted,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::NotCompleted => "Assessment Not Completed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Round to the two decimal places used in reports.
///
/// Goes through the same `{:.2}` formatting the writers use, so a value and
/// its printed form never round differently.
pub fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Compare a percentage against a scheme's pass threshold.
///
/// The percentage is compared at report precision, so a sheet showing
/// `60.00` against a threshold of 60 always reads PASS.
pub fn classify(percentage: f64, pass_threshold: f64) -> Outcome {
    if round_to_cents(percentage) >= pass_threshold {
        Outcome::Pass
    } else {
        Outcome::Fail
    }
}
