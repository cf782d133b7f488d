//! resultsheet-report: CSV and HTML writers for result sheets.

use chrono::NaiveDate;

use resultsheet_core::sheet::ResultSheet;

pub mod csv;
pub mod html;

/// Preamble details printed above a sheet.
#[derive(Debug, Clone)]
pub struct SheetHeader {
    pub title: String,
    pub assessing_body: String,
    pub assessor_name: String,
    pub batch_id: String,
    pub assessment_date: NaiveDate,
}

impl SheetHeader {
    /// Header for `sheet`, dated the day the sheet was built.
    pub fn for_sheet(
        sheet: &ResultSheet,
        title: impl Into<String>,
        assessing_body: impl Into<String>,
        assessor_name: impl Into<String>,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            assessing_body: assessing_body.into(),
            assessor_name: assessor_name.into(),
            batch_id: batch_id.into(),
            assessment_date: sheet.created_at.date_naive(),
        }
    }

    /// Preamble lines, in print order. Blank lines are empty strings.
    pub fn preamble(&self, sheet: &ResultSheet) -> Vec<String> {
        vec![
            self.title.clone(),
            format!("Name of Assessing Body: {}", self.assessing_body),
            format!("Name of Assessor: {}", self.assessor_name),
            format!("Scheme Name: {}", sheet.scheme.id),
            format!(
                "Assessment Date: {}",
                self.assessment_date.format("%d/%m/%Y")
            ),
            format!("No. of Candidates: {}", sheet.candidate_count),
            String::new(),
            format!("QP Code & Name: {}", sheet.scheme.id.to_uppercase()),
            String::new(),
        ]
    }
}

/// File stem for a batch's sheet, with path separators replaced.
pub fn sheet_file_stem(batch_id: &str) -> String {
    let safe: String = batch_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    format!("result_sheet_{safe}")
}
