//! The `resultsheet schemes` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use resultsheet_core::config::load_config_from;

pub fn execute(scheme: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = config.scheme_registry()?;

    if let Some(id) = scheme {
        let scheme = registry.get(&id)?;
        println!(
            "Scheme: {} ({} units, pass threshold {}%)",
            scheme.id,
            scheme.units.len(),
            scheme.pass_threshold
        );

        let mut table = Table::new();
        table.set_header(vec![
            "#",
            "Code",
            "Name",
            "Theory",
            "Viva",
            "Practical",
            "Project",
        ]);
        for (i, unit) in scheme.units.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&unit.code),
                Cell::new(&unit.name),
                Cell::new(unit.theory_weight),
                Cell::new(unit.viva_weight),
                Cell::new(unit.practical_weight),
                Cell::new(unit.project_weight),
            ]);
        }
        let max = scheme.max_totals();
        table.add_row(vec![
            Cell::new(""),
            Cell::new("Total"),
            Cell::new(""),
            Cell::new(max.theory),
            Cell::new(max.viva),
            Cell::new(max.practical),
            Cell::new(max.project),
        ]);
        println!("{table}");
        println!("Maximum marks: {}", max.total);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Scheme", "Units", "Pass %", "Max Marks"]);
    for scheme in registry.schemes() {
        table.add_row(vec![
            Cell::new(&scheme.id),
            Cell::new(scheme.units.len()),
            Cell::new(scheme.pass_threshold),
            Cell::new(scheme.max_totals().total),
        ]);
    }
    println!("{table}");
    println!(
        "{} scheme(s), configuration version {}",
        registry.schemes().len(),
        registry.version()
    );

    Ok(())
}
