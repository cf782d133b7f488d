//! Mark aggregation.
//!
//! Reduces a candidate's raw per-question answers into per-unit raw totals,
//! split by category. Marks accumulate additively; the possible marks of a
//! category are the largest denominator seen for it, treated as the
//! category's scale rather than summed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Answer, Category, Scheme, ScoredCategory};

/// Raw marks for one unit, accumulated over one scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitRawTotals {
    pub theory_sum: f64,
    pub theory_max: f64,
    pub viva_sum: f64,
    pub viva_max: f64,
    pub practical_sum: f64,
    pub practical_max: f64,
}

impl UnitRawTotals {
    /// `(sum, max)` for a category.
    pub fn category(&self, category: ScoredCategory) -> (f64, f64) {
        match category {
            ScoredCategory::Theory => (self.theory_sum, self.theory_max),
            ScoredCategory::Viva => (self.viva_sum, self.viva_max),
            ScoredCategory::Practical => (self.practical_sum, self.practical_max),
        }
    }

    fn add(&mut self, category: ScoredCategory, obtained: f64, possible: f64) {
        let (sum, max) = match category {
            ScoredCategory::Theory => (&mut self.theory_sum, &mut self.theory_max),
            ScoredCategory::Viva => (&mut self.viva_sum, &mut self.viva_max),
            ScoredCategory::Practical => (&mut self.practical_sum, &mut self.practical_max),
        };
        *sum += obtained;
        *max = (*max).max(possible);
    }
}

/// Why an answer was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingUnitCode,
    MissingCategory,
    UnknownCategory,
    InvalidMarks,
    UnknownUnit,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::MissingUnitCode => "missing unit code",
            RejectionReason::MissingCategory => "missing question category",
            RejectionReason::UnknownCategory => "unknown question category",
            RejectionReason::InvalidMarks => "marks obtained is not a non-negative number",
            RejectionReason::UnknownUnit => "unit code not in scheme",
        };
        f.write_str(text)
    }
}

/// A skipped answer, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedAnswer {
    /// Position of the answer in the assessment.
    pub index: usize,
    pub unit_code: String,
    pub reason: RejectionReason,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Raw totals for every unit of the scheme, keyed by unit code.
    pub totals: HashMap<String, UnitRawTotals>,
    pub rejected: Vec<RejectedAnswer>,
}

impl Aggregation {
    /// Totals for a unit; zero for codes outside the scheme.
    pub fn totals_for(&self, code: &str) -> UnitRawTotals {
        self.totals.get(code).copied().unwrap_or_default()
    }
}

/// Check one answer, returning the scored category and obtained marks.
fn check_answer(
    scheme: &Scheme,
    answer: &Answer,
) -> Result<(ScoredCategory, f64), RejectionReason> {
    if answer.unit_code.is_empty() {
        return Err(RejectionReason::MissingUnitCode);
    }
    let category = match &answer.category {
        None => return Err(RejectionReason::MissingCategory),
        Some(Category::Unrecognized(_)) => return Err(RejectionReason::UnknownCategory),
        Some(Category::Scored(c)) => *c,
    };
    let obtained = match answer.marks_obtained {
        Some(m) if m.is_finite() && m >= 0.0 => m,
        _ => return Err(RejectionReason::InvalidMarks),
    };
    if scheme.unit(&answer.unit_code).is_none() {
        return Err(RejectionReason::UnknownUnit);
    }
    Ok((category, obtained))
}

/// Reduce answers into per-unit raw totals for `scheme`.
///
/// Malformed answers are skipped and recorded; they never abort the pass.
pub fn aggregate(scheme: &Scheme, answers: &[Answer]) -> Aggregation {
    let mut totals: HashMap<String, UnitRawTotals> = scheme
        .units
        .iter()
        .map(|u| (u.code.clone(), UnitRawTotals::default()))
        .collect();
    let mut rejected = Vec::new();

    for (index, answer) in answers.iter().enumerate() {
        match check_answer(scheme, answer) {
            Ok((category, obtained)) => {
                let possible = if answer.marks_possible.is_finite() {
                    answer.marks_possible
                } else {
                    0.0
                };
                if let Some(entry) = totals.get_mut(&answer.unit_code) {
                    entry.add(category, obtained, possible);
                }
            }
            Err(reason) => {
                tracing::warn!(
                    "skipping answer #{index} (unit '{}'): {reason}",
                    answer.unit_code
                );
                rejected.push(RejectedAnswer {
                    index,
                    unit_code: answer.unit_code.clone(),
                    reason,
                });
            }
        }
    }

    Aggregation { totals, rejected }
}
