//! The `resultsheet import` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use resultsheet_core::import::{load_flat_rows, map_flat_rows};

pub fn execute(input: PathBuf, output: PathBuf) -> Result<()> {
    let rows = load_flat_rows(&input)?;
    let outcome = map_flat_rows(&rows);

    if !outcome.is_clean() {
        let mut table = Table::new();
        table.set_header(vec!["Row", "Candidate ID", "Aadhar", "Batch", "Error"]);
        for r in &outcome.rejected {
            table.add_row(vec![
                Cell::new(r.row),
                Cell::new(&r.candidate_id),
                Cell::new(&r.aadhar),
                Cell::new(&r.batch_id),
                Cell::new(&r.error),
            ]);
        }
        eprintln!("{table}");
        anyhow::bail!(
            "{} of {} candidates could not be processed; nothing written",
            outcome.rejected.len(),
            rows.len()
        );
    }

    let json = serde_json::to_string_pretty(&outcome.accepted)
        .context("failed to serialize candidates")?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, json)
        .with_context(|| format!("failed to write candidates to {}", output.display()))?;

    println!(
        "Imported {} candidate(s) to {}",
        outcome.accepted.len(),
        output.display()
    );
    for doc in &outcome.accepted {
        println!("  {} ({})", doc.aadhar, doc.name);
    }

    Ok(())
}
