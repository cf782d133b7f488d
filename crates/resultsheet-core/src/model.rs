//! Core data model types for resultsheet.
//!
//! These are the typed shapes the scoring engine works on: scheme
//! definitions, candidate records, and the answers inside an assessment.
//! Loosely shaped stored documents are converted into these types by
//! [`crate::ingest`] before they reach scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A gradable sub-area of a scheme (a NOS code) with its weight allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyUnit {
    /// Unit code, unique within its scheme (e.g. "PSC/N0130").
    pub code: String,
    /// Display name. Equal to the code for NOS-coded schemes.
    pub name: String,
    pub theory_weight: f64,
    pub viva_weight: f64,
    pub practical_weight: f64,
    /// Reserved for future scheme types; never scored from answers.
    #[serde(default)]
    pub project_weight: f64,
}

impl CompetencyUnit {
    /// Weight allocated to a scoreable category.
    pub fn weight(&self, category: ScoredCategory) -> f64 {
        match category {
            ScoredCategory::Theory => self.theory_weight,
            ScoredCategory::Viva => self.viva_weight,
            ScoredCategory::Practical => self.practical_weight,
        }
    }

    /// Sum of all four weights.
    pub fn total_weight(&self) -> f64 {
        self.theory_weight + self.viva_weight + self.practical_weight + self.project_weight
    }
}

/// A certification programme: ordered units plus a pass threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: String,
    /// Unit order defines report column order.
    pub units: Vec<CompetencyUnit>,
    /// Pass threshold as a percentage in `0..=100`.
    pub pass_threshold: f64,
}

impl Scheme {
    /// Look up a unit by code.
    pub fn unit(&self, code: &str) -> Option<&CompetencyUnit> {
        self.units.iter().find(|u| u.code == code)
    }

    /// Per-category and overall weight sums across all units.
    pub fn max_totals(&self) -> MaxTotals {
        let mut max = MaxTotals::default();
        for unit in &self.units {
            max.theory += unit.theory_weight;
            max.viva += unit.viva_weight;
            max.practical += unit.practical_weight;
            max.project += unit.project_weight;
        }
        max.total = max.theory + max.viva + max.practical + max.project;
        max
    }
}

/// Scheme-wide maximum obtainable marks, per category and overall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxTotals {
    pub theory: f64,
    pub viva: f64,
    pub practical: f64,
    pub project: f64,
    pub total: f64,
}

/// The three categories that answers are scored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoredCategory {
    Theory,
    Viva,
    Practical,
}

impl ScoredCategory {
    pub const ALL: [ScoredCategory; 3] = [
        ScoredCategory::Theory,
        ScoredCategory::Viva,
        ScoredCategory::Practical,
    ];
}

impl fmt::Display for ScoredCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoredCategory::Theory => write!(f, "theory"),
            ScoredCategory::Viva => write!(f, "viva"),
            ScoredCategory::Practical => write!(f, "practical"),
        }
    }
}

/// Question category as recorded on an answer.
///
/// Unknown values are kept rather than dropped so that format detection can
/// still see that the answer was categorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Scored(ScoredCategory),
    Unrecognized(String),
}

impl Category {
    /// Parse a raw question type. Only the empty string yields `None`; a
    /// blank value is kept as an unrecognized category.
    pub fn parse(raw: &str) -> Option<Category> {
        if raw.is_empty() {
            return None;
        }
        Some(Category::from(raw.to_string()))
    }

    pub fn scored(&self) -> Option<ScoredCategory> {
        match self {
            Category::Scored(c) => Some(*c),
            Category::Unrecognized(_) => None,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "theory" => Category::Scored(ScoredCategory::Theory),
            "viva" => Category::Scored(ScoredCategory::Viva),
            "practical" => Category::Scored(ScoredCategory::Practical),
            _ => Category::Unrecognized(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Scored(c) => write!(f, "{c}"),
            Category::Unrecognized(raw) => write!(f, "{raw}"),
        }
    }
}

/// One graded question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// NOS code of the unit this question belongs to. May be empty.
    #[serde(default)]
    pub unit_code: String,
    #[serde(default)]
    pub category: Option<Category>,
    /// `None` when the stored value was missing or not a number.
    #[serde(default)]
    pub marks_obtained: Option<f64>,
    #[serde(default)]
    pub marks_possible: f64,
}

impl Answer {
    /// Convenience constructor for a well-formed answer.
    pub fn new(
        unit_code: impl Into<String>,
        category: ScoredCategory,
        marks_obtained: f64,
        marks_possible: f64,
    ) -> Self {
        Self {
            unit_code: unit_code.into(),
            category: Some(Category::Scored(category)),
            marks_obtained: Some(marks_obtained),
            marks_possible,
        }
    }
}

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssessmentStatus {
    Completed,
    Other(String),
}

impl AssessmentStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, AssessmentStatus::Completed)
    }
}

impl From<String> for AssessmentStatus {
    fn from(value: String) -> Self {
        if value == "completed" {
            AssessmentStatus::Completed
        } else {
            AssessmentStatus::Other(value)
        }
    }
}

impl From<AssessmentStatus> for String {
    fn from(value: AssessmentStatus) -> Self {
        match value {
            AssessmentStatus::Completed => "completed".to_string(),
            AssessmentStatus::Other(raw) => raw,
        }
    }
}

/// One candidate's attempt at one scheme instance (batch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub scheme_id: String,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Input unit of work for the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assessment: Option<Assessment>,
}
