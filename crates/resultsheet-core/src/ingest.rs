//! Candidate document ingestion.
//!
//! Stored candidate documents are loosely shaped: fields go missing, marks
//! arrive as strings, categories are free text. This module is the only
//! place that sees that shape; everything downstream works on
//! [`CandidateRecord`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BatchError;
use crate::model::{Answer, Assessment, AssessmentStatus, CandidateRecord, Category};

/// A stored candidate document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidate_id: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub aadhar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assessments: Vec<AssessmentDocument>,
}

/// One assessment entry inside a candidate document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub batch_id: String,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheme_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_role: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_partner: Option<TrainingPartner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_agency: Option<AssessmentAgency>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Vec<AnswerDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPartner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tp_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tp_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub center_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub center_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enrollment_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAgency {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assessor_name: String,
}

/// One stored answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nos_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub marks_obtained: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_marks: Option<f64>,
}

impl AnswerDocument {
    pub fn to_answer(&self) -> Answer {
        Answer {
            unit_code: self.nos_code.clone().unwrap_or_default(),
            category: self.question_type.as_deref().and_then(Category::parse),
            marks_obtained: self.marks_obtained,
            marks_possible: self.total_marks.unwrap_or(0.0),
        }
    }
}

impl AssessmentDocument {
    /// Convert to the scoring model. `scheme_id` is the batch's resolved
    /// scheme, not necessarily the one recorded on this assessment.
    pub fn to_assessment(&self, scheme_id: &str) -> Assessment {
        Assessment {
            scheme_id: scheme_id.to_string(),
            status: AssessmentStatus::from(self.status.clone().unwrap_or_default()),
            answers: self.answers.iter().map(AnswerDocument::to_answer).collect(),
        }
    }

    pub fn assessor_name(&self) -> Option<&str> {
        self.assessment_agency
            .as_ref()
            .map(|a| a.assessor_name.as_str())
            .filter(|n| !n.trim().is_empty())
    }
}

impl CandidateDocument {
    /// The assessment belonging to `batch_id`, if any.
    pub fn assessment_for(&self, batch_id: &str) -> Option<&AssessmentDocument> {
        self.assessments.iter().find(|a| a.batch_id == batch_id)
    }
}

/// `null` reads as the type's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Numbers pass through; numeric strings are parsed; anything else is
/// treated as missing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    List(Vec<serde_json::Value>),
    Wrapped { data: Vec<serde_json::Value> },
}

/// Parse candidate documents from JSON: a bare array or `{ "data": [...] }`.
///
/// Each record is read on its own. A record that does not fit the document
/// shape is logged and skipped; the rest of the file still loads.
pub fn parse_documents(content: &str) -> Result<Vec<CandidateDocument>> {
    let file: DocumentFile = serde_json::from_str(content)
        .context("expected a JSON array of candidates or an object with a \"data\" array")?;
    let records = match file {
        DocumentFile::List(records) | DocumentFile::Wrapped { data: records } => records,
    };

    let mut docs = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<CandidateDocument>(record) {
            Ok(doc) => docs.push(doc),
            Err(e) => tracing::warn!("skipping candidate record #{}: {e}", index + 1),
        }
    }
    Ok(docs)
}

/// Load candidate documents from a JSON file.
pub fn load_documents(path: &Path) -> Result<Vec<CandidateDocument>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates from {}", path.display()))?;
    let docs = parse_documents(&content)
        .with_context(|| format!("failed to parse candidates in {}", path.display()))?;
    tracing::debug!("loaded {} candidate document(s) from {}", docs.len(), path.display());
    Ok(docs)
}

/// Distinct batch ids across all documents, in first-seen order.
pub fn batch_ids(docs: &[CandidateDocument]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for doc in docs {
        for assessment in &doc.assessments {
            if !ids.contains(&assessment.batch_id) {
                ids.push(assessment.batch_id.clone());
            }
        }
    }
    ids
}

/// Candidates of one batch, ready for scoring.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub batch_id: String,
    /// Scheme recorded on the first candidate's assessment, or the fallback.
    pub scheme_id: String,
    /// Assessor recorded on the first candidate's assessment, if any.
    pub assessor_name: Option<String>,
    pub candidates: Vec<CandidateRecord>,
}

/// Select the candidates of a batch and convert them for scoring.
///
/// With no `batch_id`, the input must hold exactly one batch. Candidate
/// order is preserved. The batch scheme is taken from the first matching
/// candidate; `default_scheme` applies when that assessment names none.
pub fn select_batch(
    docs: &[CandidateDocument],
    batch_id: Option<&str>,
    default_scheme: &str,
) -> Result<BatchInput, BatchError> {
    let batch_id = match batch_id {
        Some(id) => id.to_string(),
        None => {
            let mut ids = batch_ids(docs);
            match ids.len() {
                0 => return Err(BatchError::NoAssessments),
                1 => ids.remove(0),
                _ => return Err(BatchError::Ambiguous(ids)),
            }
        }
    };

    let members: Vec<(&CandidateDocument, &AssessmentDocument)> = docs
        .iter()
        .filter_map(|doc| doc.assessment_for(&batch_id).map(|a| (doc, a)))
        .collect();

    let Some((_, first)) = members.first() else {
        return Err(BatchError::NotFound(batch_id));
    };

    let scheme_id = match &first.scheme_name {
        Some(name) => name.clone(),
        None => {
            tracing::info!(
                "batch '{batch_id}' names no scheme; using default '{default_scheme}'"
            );
            default_scheme.to_string()
        }
    };
    let assessor_name = first.assessor_name().map(str::to_string);

    let candidates = members
        .iter()
        .map(|(doc, assessment)| CandidateRecord {
            id: doc.candidate_id.clone(),
            name: doc.name.clone(),
            assessment: Some(assessment.to_assessment(&scheme_id)),
        })
        .collect::<Vec<_>>();

    tracing::info!(
        "selected {} candidate(s) for batch '{batch_id}' (scheme {scheme_id})",
        candidates.len()
    );

    Ok(BatchInput {
        batch_id,
        scheme_id,
        assessor_name,
        candidates,
    })
}
