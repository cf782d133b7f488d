//! HTML result sheet.
//!
//! One standalone page: preamble, outcome summary, the sheet table, and
//! collapsible sections for skipped answers and the sheet's JSON. Styled for
//! both screen and print.

use std::path::Path;

use anyhow::{Context, Result};

use resultsheet_core::classify::Outcome;
use resultsheet_core::sheet::ResultSheet;

use crate::SheetHeader;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn row_class(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "pass",
        Outcome::Fail => "fail",
        Outcome::NotCompleted => "pending",
    }
}

fn preamble_block(sheet: &ResultSheet, header: &SheetHeader) -> String {
    let mut lines = header.preamble(sheet).into_iter();
    let title = lines.next().unwrap_or_default();
    let items: String = lines
        .filter(|l| !l.is_empty())
        .chain(std::iter::once(format!("Batch: {}", header.batch_id)))
        .map(|l| format!("    <dd>{}</dd>\n", escape(&l)))
        .collect();
    format!(
        "<header class=\"preamble\">\n  <h1>{}</h1>\n  <dl>\n{items}  </dl>\n</header>\n",
        escape(&title)
    )
}

fn summary_block(sheet: &ResultSheet) -> String {
    let cells = [
        ("Candidates", sheet.candidate_count.to_string()),
        ("PASS", sheet.outcomes.pass.to_string()),
        ("FAIL", sheet.outcomes.fail.to_string()),
        ("Not Completed", sheet.outcomes.not_completed.to_string()),
        ("Pass Mark", format!("{}%", sheet.scheme.pass_threshold)),
        ("Maximum Marks", sheet.max_totals.total.to_string()),
    ];
    let tiles: String = cells
        .iter()
        .map(|(label, value)| {
            format!("  <div class=\"tile\"><span>{label}</span><strong>{value}</strong></div>\n")
        })
        .collect();
    format!("<section class=\"tiles\">\n{tiles}</section>\n")
}

fn sheet_block(sheet: &ResultSheet) -> String {
    let head: String = sheet
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "<th data-col=\"{i}\" title=\"{}\">{}</th>",
                escape(&c.id),
                escape(&c.title)
            )
        })
        .collect();
    let body: String = sheet
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells()
                .iter()
                .map(|c| format!("<td>{}</td>", escape(c)))
                .collect();
            format!("    <tr class=\"{}\">{cells}</tr>\n", row_class(row.outcome))
        })
        .collect();
    format!(
        "<div class=\"scroll\">\n<table id=\"sheet\">\n  <thead><tr>{head}</tr></thead>\n  <tbody>\n{body}  </tbody>\n</table>\n</div>\n"
    )
}

fn skipped_block(sheet: &ResultSheet) -> Option<String> {
    let count = sheet.rejected_answer_count();
    if count == 0 {
        return None;
    }
    let rows: String = sheet
        .rows
        .iter()
        .flat_map(|row| {
            row.rejected.iter().map(move |r| {
                format!(
                    "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape(&row.candidate_id),
                    r.index,
                    escape(&r.unit_code),
                    escape(&r.reason.to_string())
                )
            })
        })
        .collect();
    Some(format!(
        "<details class=\"skipped\">\n  <summary>Skipped answers ({count})</summary>\n  <table>\n    <tr><th>Candidate</th><th>Answer #</th><th>Unit</th><th>Reason</th></tr>\n{rows}  </table>\n</details>\n"
    ))
}

/// Generate an HTML page for a result sheet.
pub fn generate_html(sheet: &ResultSheet, header: &SheetHeader) -> String {
    let json = serde_json::to_string_pretty(sheet).unwrap_or_default();

    let mut page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | {}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape(&header.title),
        escape(&header.batch_id)
    );
    page.push_str(&preamble_block(sheet, header));
    page.push_str(&summary_block(sheet));
    page.push_str(&sheet_block(sheet));
    if let Some(skipped) = skipped_block(sheet) {
        page.push_str(&skipped);
    }
    page.push_str(&format!(
        "<details class=\"json\">\n  <summary>Sheet data (JSON)</summary>\n  <pre>{}</pre>\n</details>\n",
        escape(&json)
    ));
    page.push_str(&format!(
        "<footer>Sheet {} generated {}</footer>\n<script>{SORT_SCRIPT}</script>\n</body>\n</html>\n",
        sheet.id,
        sheet.created_at.format("%d/%m/%Y %H:%M UTC")
    ));
    page
}

/// Write an HTML sheet to a file.
pub fn write_html_report(sheet: &ResultSheet, header: &SheetHeader, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, generate_html(sheet, header))
        .with_context(|| format!("failed to write HTML sheet to {}", path.display()))
}

const STYLE: &str = r#"
body { font: 14px/1.4 system-ui, sans-serif; margin: 1.5rem; color: #222; }
.preamble h1 { font-size: 1.4rem; margin: 0 0 0.5rem; }
.preamble dl { margin: 0; columns: 2; }
.preamble dd { margin: 0 0 0.2rem; }
.tiles { display: flex; gap: 0.75rem; margin: 1.25rem 0; flex-wrap: wrap; }
.tile { border: 1px solid #ccc; border-radius: 4px; padding: 0.4rem 0.8rem; min-width: 7rem; }
.tile span { display: block; font-size: 0.75rem; color: #666; }
.scroll { overflow-x: auto; }
#sheet, .skipped table { border-collapse: collapse; }
#sheet th, #sheet td, .skipped th, .skipped td { border: 1px solid #bbb; padding: 0.25rem 0.5rem; white-space: nowrap; }
#sheet th { background: #eee; cursor: pointer; user-select: none; }
#sheet td { text-align: right; }
#sheet td:nth-child(2), #sheet td:nth-child(3), #sheet td:last-child { text-align: left; }
tr.pass td:last-child { color: #176b2c; font-weight: 600; }
tr.fail td:last-child { color: #a11d1d; font-weight: 600; }
tr.pending td { color: #777; }
details { margin-top: 1rem; }
pre { font-size: 12px; background: #f6f6f6; padding: 0.75rem; overflow-x: auto; }
footer { margin-top: 1.5rem; font-size: 0.75rem; color: #888; }
@media print {
  .tiles, details, footer { display: none; }
  #sheet th { cursor: auto; }
}
"#;

const SORT_SCRIPT: &str = r#"
document.querySelectorAll('#sheet th').forEach(th => {
  th.addEventListener('click', () => {
    const col = Number(th.dataset.col);
    const body = document.querySelector('#sheet tbody');
    const dir = th.dataset.dir === 'up' ? -1 : 1;
    th.dataset.dir = dir === 1 ? 'up' : 'down';
    const key = tr => {
      const text = tr.children[col].textContent.trim();
      const n = Number(text);
      return text !== '' && !Number.isNaN(n) ? n : text;
    };
    [...body.rows]
      .sort((x, y) => {
        const a = key(x), b = key(y);
        return dir * (typeof a === 'number' && typeof b === 'number' ? a - b : String(a).localeCompare(String(b)));
      })
      .forEach(tr => body.appendChild(tr));
  });
});
"#;
