//! The `resultsheet init` command.

use std::path::Path;

use anyhow::Result;

use resultsheet_core::scheme::BUILTIN_SCHEMES;

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing("resultsheet.toml", SAMPLE_CONFIG)?;
    write_if_missing("schemes.toml", BUILTIN_SCHEMES)?;

    println!("\nNext steps:");
    println!("  1. Edit resultsheet.toml with your assessing body and assessor");
    println!("  2. Run: resultsheet validate --schemes schemes.toml");
    println!("  3. Run: resultsheet sheet --input candidates.json --batch \"<batch id>\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# resultsheet configuration

assessing_body = "WMPSC Assessor"
assessor_name = "${RESULTSHEET_ASSESSOR}"
default_scheme = "mbjr"
schemes_file = "schemes.toml"
output_dir = "./resultsheet-results"
report_title = "RESULT SHEET"
"#;
