//! The `resultsheet validate` command.

use std::path::PathBuf;

use anyhow::Result;

use resultsheet_core::config::load_config_from;
use resultsheet_core::ingest::{batch_ids, load_documents, select_batch};
use resultsheet_core::scheme::{validate_registry, SchemeRegistry};
use resultsheet_core::sheet::score_batch;

pub fn execute(
    schemes_path: Option<PathBuf>,
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = match &schemes_path {
        Some(path) => SchemeRegistry::from_path(path)?,
        None => config.scheme_registry()?,
    };

    println!(
        "Schemes: {} (configuration version {})",
        registry.schemes().len(),
        registry.version()
    );

    let mut total_warnings = 0;

    let warnings = validate_registry(&registry);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.scheme_id, w.message);
    }
    total_warnings += warnings.len();

    if let Some(input) = &input {
        let docs = load_documents(input)?;
        let batches = batch_ids(&docs);
        println!(
            "Candidates: {} in {} batch(es)",
            docs.len(),
            batches.len()
        );

        for id in &batches {
            let batch = select_batch(&docs, Some(id.as_str()), &config.default_scheme)?;
            match score_batch(&registry, &batch.scheme_id, &batch.candidates) {
                Ok(sheet) => {
                    println!(
                        "  Batch '{id}': {} candidates, scheme {}",
                        sheet.candidate_count, sheet.scheme.id
                    );
                    for row in &sheet.rows {
                        for r in &row.rejected {
                            println!(
                                "    [{}] WARNING: answer #{} (unit '{}'): {}",
                                row.candidate_id, r.index, r.unit_code, r.reason
                            );
                            total_warnings += 1;
                        }
                    }
                }
                Err(e) => {
                    println!("  Batch '{id}' WARNING: {e}");
                    total_warnings += 1;
                }
            }
        }
    }

    if total_warnings == 0 {
        println!("All inputs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
