//! CSV result sheet writer.
//!
//! Output is a plain-text preamble followed by a CSV table: one header
//! record of column titles, then one record per candidate.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use resultsheet_core::sheet::ResultSheet;

use crate::SheetHeader;

/// Write the preamble and table to `out`.
pub fn write_csv<W: Write>(sheet: &ResultSheet, header: &SheetHeader, mut out: W) -> Result<()> {
    for line in header.preamble(sheet) {
        writeln!(out, "{line}")?;
    }

    let mut writer = ::csv::Writer::from_writer(out);
    writer.write_record(sheet.columns.iter().map(|c| c.title.as_str()))?;
    for row in &sheet.rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the sheet as a CSV string.
pub fn generate_csv(sheet: &ResultSheet, header: &SheetHeader) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(sheet, header, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Write a CSV sheet to a file.
pub fn write_csv_report(sheet: &ResultSheet, header: &SheetHeader, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(sheet, header, std::io::BufWriter::new(file))
        .with_context(|| format!("failed to write CSV sheet to {}", path.display()))
}
