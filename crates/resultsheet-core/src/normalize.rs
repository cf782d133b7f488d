//! Score normalization.
//!
//! Rescales raw per-unit totals onto each unit's configured weights, caps
//! every component at its weight, and reduces unit scores to sheet totals
//! and a percentage.

use serde::{Deserialize, Serialize};

use crate::aggregate::UnitRawTotals;
use crate::model::{CompetencyUnit, ScoredCategory};

/// Weighted points for one unit. Each field is at most the unit's weight
/// for that category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitScore {
    pub theory: f64,
    pub viva: f64,
    pub practical: f64,
    /// Never computed from answers; always 0.
    pub project: f64,
}

impl UnitScore {
    pub fn total(&self) -> f64 {
        self.theory + self.viva + self.practical + self.project
    }
}

/// Linear rescale of `sum / max` onto `weight`, capped at `weight`.
///
/// Returns 0 unless both `sum` and `max` are positive. The cap absorbs
/// `sum > max`, which happens with duplicated or malformed answers.
pub fn weighted_score(sum: f64, max: f64, weight: f64) -> f64 {
    if sum > 0.0 && max > 0.0 {
        (sum / max * weight).min(weight)
    } else {
        0.0
    }
}

/// Normalize one unit's raw totals into weighted scores.
pub fn normalize_unit(unit: &CompetencyUnit, raw: &UnitRawTotals) -> UnitScore {
    let score = |category: ScoredCategory| {
        let (sum, max) = raw.category(category);
        weighted_score(sum, max, unit.weight(category))
    };

    UnitScore {
        theory: score(ScoredCategory::Theory),
        viva: score(ScoredCategory::Viva),
        practical: score(ScoredCategory::Practical),
        project: 0.0,
    }
}

/// Per-category sums across all units of a sheet row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTotals {
    pub theory: f64,
    pub viva: f64,
    pub practical: f64,
    pub project: f64,
    /// theory + viva + practical + project
    pub marks: f64,
}

impl ScoreTotals {
    pub fn from_units(units: &[UnitScore]) -> Self {
        let mut totals = ScoreTotals::default();
        for unit in units {
            totals.theory += unit.theory;
            totals.viva += unit.viva;
            totals.practical += unit.practical;
            totals.project += unit.project;
        }
        totals.marks = totals.theory + totals.viva + totals.practical + totals.project;
        totals
    }
}

/// Percentage of `max_total` obtained, capped at 100. Zero when the scheme
/// has no obtainable marks.
pub fn percentage(total_marks: f64, max_total: f64) -> f64 {
    if max_total > 0.0 {
        (total_marks / max_total * 100.0).min(100.0).max(0.0)
    } else {
        0.0
    }
}
