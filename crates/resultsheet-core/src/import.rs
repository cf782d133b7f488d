//! Bulk candidate import.
//!
//! Upload rows arrive flattened, with nested fields under dotted keys such
//! as `assessments[0].schemeName`. Each row is mapped to a
//! [`CandidateDocument`] with registration defaults filled in, then checked
//! for identity problems. An upload with any refused row is refused whole.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ImportError;
use crate::ingest::{
    AnswerDocument, AssessmentAgency, AssessmentDocument, CandidateDocument, TrainingPartner,
};

/// One flattened upload row.
pub type FlatRow = Map<String, Value>;

const DEFAULT_SCHEME: &str = "pg";
const DEFAULT_STATUS: &str = "to_be_requested";
const DEFAULT_RESULT: &str = "pending";
const DEFAULT_AGENCY: &str = "WMPSC Assessor";
const DEFAULT_ASSESSOR: &str = "Rohit Shah";
const DEFAULT_EMAIL: &str = "wmpsc@wmpsc.in";
const DEFAULT_DATE_OF_BIRTH: &str = "01-01-2000";
const DEFAULT_GENDER: &str = "male";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_TP_STATUS: &str = "active";
const DEFAULT_TP_ID: &str = "WMPSC001";
const DEFAULT_CENTER_NAME: &str = "Online Center";
const DEFAULT_CENTER_ADDRESS: &str = "Online";
const DEFAULT_ENROLLMENT_DATE: &str = "01-01-2025";

/// A refused upload row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    /// 1-based row number in the upload.
    pub row: usize,
    pub candidate_id: String,
    pub aadhar: String,
    pub batch_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ImportError,
}

fn serialize_display<S: serde::Serializer>(
    error: &ImportError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of mapping an upload.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub accepted: Vec<CandidateDocument>,
    pub rejected: Vec<RowRejection>,
}

impl ImportOutcome {
    /// True when every row was accepted and the upload may be stored.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Non-empty text at `key`. Numbers are rendered as text, since ids such as
/// aadhar numbers often arrive unquoted.
fn text(row: &FlatRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_or(row: &FlatRow, key: &str, default: &str) -> String {
    text(row, key).unwrap_or_else(|| default.to_string())
}

fn answers(row: &FlatRow) -> Vec<AnswerDocument> {
    match row.get("assessments[0].answers") {
        Some(value) if value.is_array() => match serde_json::from_value(value.clone()) {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!("ignoring unreadable answers in upload row: {e}");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

/// Map one flattened row to a candidate document with defaults applied.
pub fn map_row(row: &FlatRow) -> CandidateDocument {
    let aadhar = text(row, "aadhar").unwrap_or_default();
    let candidate_id = if aadhar.is_empty() {
        text(row, "candidateId").unwrap_or_default()
    } else {
        aadhar.clone()
    };

    let tp_name = text(row, "tpName").unwrap_or_default();
    let location = text(row, "location").unwrap_or_default();
    // Without a training partner name the id would be a bare "WMPSC-"; use
    // the shared placeholder id instead.
    let tp_id = if tp_name.is_empty() {
        DEFAULT_TP_ID.to_string()
    } else {
        format!("WMPSC-{tp_name}")
    };

    let assessment = AssessmentDocument {
        batch_id: format!("{tp_name} - {location}"),
        scheme_name: Some(text_or(row, "assessments[0].schemeName", DEFAULT_SCHEME)),
        job_role: Some(text_or(row, "assessments[0].jobRole", DEFAULT_SCHEME)),
        status: Some(text_or(row, "assessments[0].status", DEFAULT_STATUS)),
        result: Some(text_or(row, "assessments[0].result", DEFAULT_RESULT)),
        completed_at: text(row, "assessments[0].completedAt"),
        training_partner: Some(TrainingPartner {
            status: text_or(
                row,
                "assessments[0].trainingPartner.status",
                DEFAULT_TP_STATUS,
            ),
            tp_id,
            center_name: text_or(
                row,
                "assessments[0].trainingPartner.centerName",
                DEFAULT_CENTER_NAME,
            ),
            center_address: text_or(
                row,
                "assessments[0].trainingPartner.centerAddress",
                DEFAULT_CENTER_ADDRESS,
            ),
            enrollment_date: text_or(
                row,
                "assessments[0].trainingPartner.enrollmentDate",
                DEFAULT_ENROLLMENT_DATE,
            ),
            tp_name,
        }),
        assessment_agency: Some(AssessmentAgency {
            name: text_or(row, "assessments[0].assessmentAgency.name", DEFAULT_AGENCY),
            assessor_name: text_or(
                row,
                "assessments[0].assessmentAgency.assessorName",
                DEFAULT_ASSESSOR,
            ),
        }),
        answers: answers(row),
    };

    CandidateDocument {
        name: text(row, "name").unwrap_or_default(),
        candidate_id,
        aadhar,
        mobile: Some(text(row, "mobile").unwrap_or_default()),
        email: Some(text_or(row, "email", DEFAULT_EMAIL)),
        date_of_birth: Some(text_or(row, "dateOfBirth", DEFAULT_DATE_OF_BIRTH)),
        gender: Some(text_or(row, "gender", DEFAULT_GENDER)),
        category: Some(text_or(row, "category", DEFAULT_CATEGORY)),
        assessments: vec![assessment],
    }
}

/// Map and check every row of an upload.
pub fn map_flat_rows(rows: &[FlatRow]) -> ImportOutcome {
    let mut seen = HashSet::new();
    let mut outcome = ImportOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        let doc = map_row(row);
        let reject = |error: ImportError| RowRejection {
            row: index + 1,
            candidate_id: doc.candidate_id.clone(),
            aadhar: doc.aadhar.clone(),
            batch_id: doc
                .assessments
                .first()
                .map(|a| a.batch_id.clone())
                .unwrap_or_default(),
            error,
        };

        if doc.candidate_id.is_empty() || doc.aadhar.is_empty() {
            tracing::warn!("row {} refused: missing candidateId or aadhar", index + 1);
            outcome.rejected.push(reject(ImportError::MissingId));
            continue;
        }
        if !seen.insert(doc.aadhar.clone()) {
            tracing::warn!("row {} refused: duplicate aadhar {}", index + 1, doc.aadhar);
            outcome
                .rejected
                .push(reject(ImportError::DuplicateAadhar(doc.aadhar.clone())));
            continue;
        }

        tracing::debug!("row {} mapped (aadhar {})", index + 1, doc.aadhar);
        outcome.accepted.push(doc);
    }

    tracing::info!(
        "mapped {} upload row(s): {} accepted, {} refused",
        rows.len(),
        outcome.accepted.len(),
        outcome.rejected.len()
    );
    outcome
}

fn parse_json_rows(content: &str) -> Result<Vec<FlatRow>> {
    let value: Value = serde_json::from_str(content).context("upload is not valid JSON")?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => bail!("expected a JSON array of rows or an object with a \"data\" array"),
        },
        _ => bail!("expected a JSON array of rows or an object with a \"data\" array"),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            _ => bail!("upload row {} is not an object", i + 1),
        })
        .collect()
}

fn parse_csv_rows(content: &str) -> Result<Vec<FlatRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader.headers().context("failed to read CSV header")?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read CSV record")?;
        let row: FlatRow = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Load upload rows from a `.csv` file or a JSON file.
pub fn load_flat_rows(path: &Path) -> Result<Vec<FlatRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read upload {}", path.display()))?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let rows = if is_csv {
        parse_csv_rows(&content)
    } else {
        parse_json_rows(&content)
    }
    .with_context(|| format!("failed to parse upload {}", path.display()))?;

    if rows.is_empty() {
        bail!("upload {} contains no candidates", path.display());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> FlatRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn defaults_are_filled() {
        let doc = map_row(&row(json!({
            "name": "Asha",
            "aadhar": "111122223333",
            "tpName": "Acme",
            "location": "Pune"
        })));
        assert_eq!(doc.candidate_id, "111122223333");
        assert_eq!(doc.email.as_deref(), Some(DEFAULT_EMAIL));
        let a = &doc.assessments[0];
        assert_eq!(a.batch_id, "Acme - Pune");
        assert_eq!(a.scheme_name.as_deref(), Some("pg"));
        assert_eq!(a.job_role.as_deref(), Some("pg"));
        assert_eq!(a.status.as_deref(), Some("to_be_requested"));
        let agency = a.assessment_agency.as_ref().unwrap();
        assert_eq!(agency.name, "WMPSC Assessor");
        assert_eq!(agency.assessor_name, "Rohit Shah");
        assert_eq!(a.training_partner.as_ref().unwrap().tp_id, "WMPSC-Acme");
        assert!(a.answers.is_empty());
    }

    #[test]
    fn dotted_keys_override_defaults() {
        let doc = map_row(&row(json!({
            "aadhar": 999988887777u64,
            "assessments[0].schemeName": "sewage_treatment",
            "assessments[0].status": "completed",
            "assessments[0].assessmentAgency.assessorName": "R. Iyer",
            "assessments[0].answers": [
                { "nosCode": "PSC/N0130", "questionType": "theory", "marksObtained": 3, "totalMarks": 5 }
            ]
        })));
        assert_eq!(doc.aadhar, "999988887777");
        let a = &doc.assessments[0];
        assert_eq!(a.scheme_name.as_deref(), Some("sewage_treatment"));
        assert_eq!(a.status.as_deref(), Some("completed"));
        assert_eq!(a.assessor_name(), Some("R. Iyer"));
        assert_eq!(a.answers.len(), 1);
    }

    #[test]
    fn missing_training_partner_uses_placeholder_id() {
        let doc = map_row(&row(json!({ "aadhar": "111122223333", "location": "Pune" })));
        let a = &doc.assessments[0];
        assert_eq!(a.batch_id, " - Pune");
        let tp = a.training_partner.as_ref().unwrap();
        assert_eq!(tp.tp_name, "");
        assert_eq!(tp.tp_id, DEFAULT_TP_ID);
    }

    #[test]
    fn candidate_id_falls_back_when_aadhar_missing() {
        let doc = map_row(&row(json!({ "candidateId": "C-1" })));
        assert_eq!(doc.candidate_id, "C-1");
        assert_eq!(doc.aadhar, "");
    }

    #[test]
    fn missing_ids_and_duplicates_are_refused() {
        let rows = vec![
            row(json!({ "name": "A", "aadhar": "1" })),
            row(json!({ "name": "B", "candidateId": "C-2" })),
            row(json!({ "name": "C", "aadhar": "1" })),
            row(json!({ "name": "D", "aadhar": "4" })),
        ];
        let outcome = map_flat_rows(&rows);
        assert!(!outcome.is_clean());
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].row, 2);
        assert_eq!(outcome.rejected[0].error, ImportError::MissingId);
        assert_eq!(outcome.rejected[1].row, 3);
        assert_eq!(
            outcome.rejected[1].error,
            ImportError::DuplicateAadhar("1".into())
        );
    }

    #[test]
    fn clean_upload() {
        let rows = vec![row(json!({ "aadhar": "1" })), row(json!({ "aadhar": "2" }))];
        assert!(map_flat_rows(&rows).is_clean());
    }

    #[test]
    fn rejection_serializes_error_text() {
        let rows = vec![row(json!({ "name": "A" }))];
        let outcome = map_flat_rows(&rows);
        let json = serde_json::to_value(&outcome.rejected[0]).unwrap();
        assert_eq!(json["error"], "missing candidateId or aadhar");
    }

    #[test]
    fn loads_json_and_csv_uploads() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("upload.json");
        std::fs::write(&json_path, r#"{ "data": [ { "aadhar": "1" } ] }"#).unwrap();
        assert_eq!(load_flat_rows(&json_path).unwrap().len(), 1);

        let csv_path = dir.path().join("upload.csv");
        std::fs::write(
            &csv_path,
            "name,aadhar,tpName,location,assessments[0].schemeName\n Asha ,1,Acme,Pune,mbjr\n",
        )
        .unwrap();
        let rows = load_flat_rows(&csv_path).unwrap();
        let doc = map_row(&rows[0]);
        assert_eq!(doc.name, "Asha");
        assert_eq!(doc.assessments[0].scheme_name.as_deref(), Some("mbjr"));

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(load_flat_rows(&empty).is_err());
    }
}
