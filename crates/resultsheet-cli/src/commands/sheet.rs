//! The `resultsheet sheet` command.

use std::path::PathBuf;

use anyhow::Result;

use resultsheet_core::config::load_config_from;
use resultsheet_core::ingest::{load_documents, select_batch};
use resultsheet_core::sheet::{score_batch, ResultSheet};
use resultsheet_report::csv::write_csv_report;
use resultsheet_report::html::write_html_report;
use resultsheet_report::{sheet_file_stem, SheetHeader};

const FORMATS: [&str; 3] = ["csv", "json", "html"];

fn parse_formats(format: &str) -> Result<Vec<&str>> {
    if format == "all" {
        return Ok(FORMATS.to_vec());
    }
    let formats: Vec<&str> = format
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    for fmt in &formats {
        anyhow::ensure!(
            FORMATS.contains(fmt),
            "unknown format '{fmt}' (expected csv, json, html or all)"
        );
    }
    Ok(formats)
}

pub fn execute(
    input: PathBuf,
    batch: Option<String>,
    scheme: Option<String>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let config = load_config_from(config_path.as_deref())?;
    let registry = config.scheme_registry()?;
    tracing::debug!(?config, "loaded configuration");

    let docs = load_documents(&input)?;
    let batch = select_batch(&docs, batch.as_deref(), &config.default_scheme)?;
    let scheme_id = scheme.unwrap_or_else(|| batch.scheme_id.clone());

    eprintln!(
        "resultsheet v{}: scoring batch '{}' ({} candidates, scheme {})",
        env!("CARGO_PKG_VERSION"),
        batch.batch_id,
        batch.candidates.len(),
        scheme_id
    );

    let sheet = score_batch(&registry, &scheme_id, &batch.candidates)?;

    print_summary(&sheet);

    let header = SheetHeader::for_sheet(
        &sheet,
        config.report_title.as_str(),
        config.assessing_body.as_str(),
        config.assessor_for(batch.assessor_name.as_deref()),
        batch.batch_id.as_str(),
    );

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output)?;
    let stem = sheet_file_stem(&batch.batch_id);

    for fmt in &formats {
        match *fmt {
            "csv" => {
                let path = output.join(format!("{stem}.csv"));
                write_csv_report(&sheet, &header, &path)?;
                eprintln!("CSV sheet: {}", path.display());
            }
            "json" => {
                let path = output.join(format!("{stem}.json"));
                sheet.save_json(&path)?;
                eprintln!("JSON sheet: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(&sheet, &header, &path)?;
                eprintln!("HTML sheet: {}", path.display());
            }
            _ => unreachable!("formats are checked by parse_formats"),
        }
    }

    Ok(())
}

fn print_summary(sheet: &ResultSheet) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "S No.",
        "Candidate",
        "Name",
        "Total Marks",
        "Percentage",
        "Result",
    ]);

    for row in &sheet.rows {
        table.add_row(vec![
            Cell::new(row.serial),
            Cell::new(&row.candidate_id),
            Cell::new(&row.candidate_name),
            Cell::new(format!("{:.2}/{}", row.totals.marks, sheet.max_totals.total)),
            Cell::new(format!("{:.2}%", row.percentage)),
            Cell::new(row.outcome),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "\n{} PASS, {} FAIL, {} not completed",
        sheet.outcomes.pass, sheet.outcomes.fail, sheet.outcomes.not_completed
    );
    let rejected = sheet.rejected_answer_count();
    if rejected > 0 {
        eprintln!("{rejected} answer(s) skipped; run `resultsheet validate --input` for details");
    }
}
