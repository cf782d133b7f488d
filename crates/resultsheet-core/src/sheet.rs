//! Result sheet assembly with JSON persistence.
//!
//! Turns a batch of candidate records into fixed-column rows for one
//! scheme. Column layout is driven entirely by the scheme's unit order:
//! three identity columns, four columns per unit, then seven totals.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{aggregate, RejectedAnswer};
use crate::classify::{classify, Outcome};
use crate::detect::{detect, AnswerFormat};
use crate::error::SheetError;
use crate::model::{CandidateRecord, MaxTotals, Scheme};
use crate::normalize::{normalize_unit, percentage, ScoreTotals, UnitScore};
use crate::scheme::SchemeRegistry;

/// Scheme whose column titles use unit names instead of unit codes.
const NAME_PREFIXED_SCHEME: &str = "mbjr";

/// Number of identity columns before the per-unit block.
pub const LEADING_COLUMNS: usize = 3;
/// Columns emitted per competency unit.
pub const COLUMNS_PER_UNIT: usize = 4;
/// Totals columns after the per-unit block.
pub const TRAILING_COLUMNS: usize = 7;

/// One output column: a stable id plus its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
}

impl Column {
    fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    fn plain(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Build the column descriptors for a scheme.
pub fn columns(scheme: &Scheme) -> Vec<Column> {
    let mut cols = Vec::with_capacity(
        LEADING_COLUMNS + scheme.units.len() * COLUMNS_PER_UNIT + TRAILING_COLUMNS,
    );
    cols.push(Column::plain("S No."));
    cols.push(Column::plain("STUDENT UNIQUE ID"));
    cols.push(Column::plain("Name of the Candidate"));

    for (index, unit) in scheme.units.iter().enumerate() {
        let n = index + 1;
        let prefix = if scheme.id == NAME_PREFIXED_SCHEME {
            &unit.name
        } else {
            &unit.code
        };
        cols.push(Column::new(
            format!("Module {n} Theory"),
            format!("{prefix} Theory ({})", unit.theory_weight),
        ));
        cols.push(Column::new(
            format!("Module {n} Project"),
            format!("{prefix} Project ({})", unit.project_weight),
        ));
        cols.push(Column::new(
            format!("Module {n} Viva"),
            format!("{prefix} Viva ({})", unit.viva_weight),
        ));
        cols.push(Column::new(
            format!("Module {n} Practical"),
            format!("{prefix} Practical ({})", unit.practical_weight),
        ));
    }

    let max = scheme.max_totals();
    cols.push(Column::new(
        "Total Theory",
        format!("Total Theory ({})", max.theory),
    ));
    cols.push(Column::new(
        "Total Project",
        format!("Total Project ({})", max.project),
    ));
    cols.push(Column::new("Total Viva", format!("Total Viva ({})", max.viva)));
    cols.push(Column::new(
        "Total Practical",
        format!("Total Practical ({})", max.practical),
    ));
    cols.push(Column::new(
        "Total Marks",
        format!("Total Marks ({})", max.total),
    ));
    cols.push(Column::plain("Percentage (100)"));
    cols.push(Column::plain("Final Result"));
    cols
}

/// How a candidate's row was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// Assessment missing, not completed, or without answers.
    NotAssessed,
    /// Completed, but no answer carries a category; scored as zero.
    Unscoreable,
    Scored,
}

/// One candidate's scored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// 1-based position in the batch.
    pub serial: usize,
    pub candidate_id: String,
    pub candidate_name: String,
    pub state: RowState,
    /// One entry per scheme unit, in scheme order.
    pub units: Vec<UnitScore>,
    pub totals: ScoreTotals,
    pub percentage: f64,
    pub outcome: Outcome,
    /// Answers skipped while aggregating this candidate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedAnswer>,
}

impl ResultRow {
    /// Cell values in column order, numeric fields at two decimal places.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(
            LEADING_COLUMNS + self.units.len() * COLUMNS_PER_UNIT + TRAILING_COLUMNS,
        );
        cells.push(self.serial.to_string());
        cells.push(self.candidate_id.clone());
        cells.push(self.candidate_name.clone());
        for unit in &self.units {
            cells.push(format!("{:.2}", unit.theory));
            cells.push(format!("{:.2}", unit.project));
            cells.push(format!("{:.2}", unit.viva));
            cells.push(format!("{:.2}", unit.practical));
        }
        cells.push(format!("{:.2}", self.totals.theory));
        cells.push(format!("{:.2}", self.totals.project));
        cells.push(format!("{:.2}", self.totals.viva));
        cells.push(format!("{:.2}", self.totals.practical));
        cells.push(format!("{:.2}", self.totals.marks));
        cells.push(format!("{:.2}", self.percentage));
        cells.push(self.outcome.label().to_string());
        cells
    }
}

/// Score one candidate against a scheme. `max_totals` must be
/// `scheme.max_totals()`.
pub fn build_row(
    scheme: &Scheme,
    max_totals: &MaxTotals,
    candidate: &CandidateRecord,
    serial: usize,
) -> ResultRow {
    let zero_units = || vec![UnitScore::default(); scheme.units.len()];

    let assessment = match &candidate.assessment {
        Some(a) if a.status.is_completed() && !a.answers.is_empty() => a,
        _ => {
            tracing::debug!(
                "candidate {} ({}) has no completed assessment or answers",
                candidate.name,
                candidate.id
            );
            return ResultRow {
                serial,
                candidate_id: candidate.id.clone(),
                candidate_name: candidate.name.clone(),
                state: RowState::NotAssessed,
                units: zero_units(),
                totals: ScoreTotals::default(),
                percentage: 0.0,
                outcome: Outcome::NotCompleted,
                rejected: Vec::new(),
            };
        }
    };

    let (state, units, rejected) = match detect(assessment) {
        AnswerFormat::Unscoreable => {
            tracing::warn!(
                "no categorized answers for candidate {} ({}); scoring as zero",
                candidate.name,
                candidate.id
            );
            (RowState::Unscoreable, zero_units(), Vec::new())
        }
        AnswerFormat::Scoreable => {
            let aggregation = aggregate(scheme, &assessment.answers);
            let units: Vec<UnitScore> = scheme
                .units
                .iter()
                .map(|unit| {
                    let raw = aggregation.totals_for(&unit.code);
                    let score = normalize_unit(unit, &raw);
                    tracing::debug!(
                        "candidate {}, {}: theory {:.2}/{}, viva {:.2}/{}, practical {:.2}/{}",
                        candidate.id,
                        unit.code,
                        score.theory,
                        unit.theory_weight,
                        score.viva,
                        unit.viva_weight,
                        score.practical,
                        unit.practical_weight
                    );
                    score
                })
                .collect();
            (RowState::Scored, units, aggregation.rejected)
        }
    };

    let totals = ScoreTotals::from_units(&units);
    let percentage = percentage(totals.marks, max_totals.total);
    let outcome = classify(percentage, scheme.pass_threshold);

    ResultRow {
        serial,
        candidate_id: candidate.id.clone(),
        candidate_name: candidate.name.clone(),
        state,
        units,
        totals,
        percentage,
        outcome,
        rejected,
    }
}

/// Summary of the scheme a sheet was built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeSummary {
    pub id: String,
    pub unit_count: usize,
    pub pass_threshold: f64,
}

/// Outcome tallies across a sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub pass: usize,
    pub fail: usize,
    pub not_completed: usize,
}

impl OutcomeCounts {
    fn tally(rows: &[ResultRow]) -> Self {
        let mut counts = OutcomeCounts::default();
        for row in rows {
            match row.outcome {
                Outcome::Pass => counts.pass += 1,
                Outcome::Fail => counts.fail += 1,
                Outcome::NotCompleted => counts.not_completed += 1,
            }
        }
        counts
    }
}

/// A complete result sheet for one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSheet {
    /// Unique sheet identifier.
    pub id: Uuid,
    /// When the sheet was built.
    pub created_at: DateTime<Utc>,
    pub scheme: SchemeSummary,
    /// Column descriptors, in output order.
    pub columns: Vec<Column>,
    /// One row per candidate, in input order.
    pub rows: Vec<ResultRow>,
    pub max_totals: MaxTotals,
    pub candidate_count: usize,
    pub outcomes: OutcomeCounts,
}

impl ResultSheet {
    /// Total number of answers skipped across all rows.
    pub fn rejected_answer_count(&self) -> usize {
        self.rows.iter().map(|r| r.rejected.len()).sum()
    }

    /// Save the sheet as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize sheet")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write sheet to {}", path.display()))?;
        Ok(())
    }

    /// Load a sheet from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sheet from {}", path.display()))?;
        let sheet: ResultSheet =
            serde_json::from_str(&content).context("failed to parse sheet JSON")?;
        Ok(sheet)
    }
}

/// Score a batch of candidates against a resolved scheme.
///
/// Candidates are scored in parallel; rows keep input order and serial
/// numbers run 1..=n.
pub fn build_result_sheet(
    scheme: &Scheme,
    candidates: &[CandidateRecord],
) -> Result<ResultSheet, SheetError> {
    if scheme.units.is_empty() {
        return Err(SheetError::EmptyModuleList(scheme.id.clone()));
    }

    let max_totals = scheme.max_totals();
    let rows: Vec<ResultRow> = candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| build_row(scheme, &max_totals, candidate, index + 1))
        .collect();

    let outcomes = OutcomeCounts::tally(&rows);
    tracing::info!(
        "scored {} candidate(s) for scheme {}: {} pass, {} fail, {} not completed",
        rows.len(),
        scheme.id,
        outcomes.pass,
        outcomes.fail,
        outcomes.not_completed
    );

    Ok(ResultSheet {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        scheme: SchemeSummary {
            id: scheme.id.clone(),
            unit_count: scheme.units.len(),
            pass_threshold: scheme.pass_threshold,
        },
        columns: columns(scheme),
        candidate_count: rows.len(),
        rows,
        max_totals,
        outcomes,
    })
}

/// Resolve `scheme_id` in the registry and score the batch.
pub fn score_batch(
    registry: &SchemeRegistry,
    scheme_id: &str,
    candidates: &[CandidateRecord],
) -> Result<ResultSheet, SheetError> {
    let scheme = registry.get_scoreable(scheme_id)?;
    build_result_sheet(scheme, candidates)
}
