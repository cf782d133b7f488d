//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PUNE: &str = "Acme Skills - Pune";
const NASHIK: &str = "Acme Skills - Nashik";

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../samples")
        .join(name)
}

/// A command isolated from any config in the working or home directory.
fn resultsheet(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("resultsheet").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RESULTSHEET_ASSESSOR");
    cmd
}

#[test]
fn sheet_writes_csv_with_preamble() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(PUNE)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("1 PASS, 1 FAIL, 1 not completed"))
        .stderr(predicate::str::contains("1 answer(s) skipped"));

    let path = dir
        .path()
        .join("out")
        .join(format!("result_sheet_{PUNE}.csv"));
    let csv = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "RESULT SHEET");
    assert_eq!(lines[1], "Name of Assessing Body: WMPSC Assessor");
    assert_eq!(lines[2], "Name of Assessor: R. Iyer");
    assert_eq!(lines[3], "Scheme Name: pg");
    assert!(lines[4].starts_with("Assessment Date: "));
    assert_eq!(lines[5], "No. of Candidates: 3");
    assert_eq!(lines[7], "QP Code & Name: PG");
    assert!(lines[9].starts_with("S No.,STUDENT UNIQUE ID,Name of the Candidate,PSC/N0130 Theory (15)"));
    assert_eq!(lines.len(), 13);

    assert!(lines[10].starts_with("1,111122223333,Asha Patil,15.00,0.00,5.00,0.00,"));
    assert!(lines[10].ends_with(",310.00,100.00,PASS"));
    assert!(lines[11].ends_with(",155.00,50.00,FAIL"));
    assert!(lines[12].starts_with("3,777788889999,Meena Das,0.00"));
    assert!(lines[12].ends_with(",0.00,0.00,Assessment Not Completed"));
}

#[test]
fn sheet_all_formats() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(PUNE)
        .arg("--format")
        .arg("all")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("JSON sheet:"))
        .stderr(predicate::str::contains("HTML sheet:"));

    let json = std::fs::read_to_string(out.join(format!("result_sheet_{PUNE}.json"))).unwrap();
    let sheet: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(sheet["candidate_count"], 3);
    assert_eq!(sheet["scheme"]["id"], "pg");
    assert_eq!(sheet["rows"][0]["outcome"], "PASS");
    assert_eq!(sheet["rows"][2]["outcome"], "Assessment Not Completed");
    assert_eq!(sheet["rows"][1]["rejected"][0]["reason"], "unknown_unit");
    assert_eq!(sheet["columns"].as_array().unwrap().len(), 3 + 7 * 4 + 7);

    let html = std::fs::read_to_string(out.join(format!("result_sheet_{PUNE}.html"))).unwrap();
    assert!(html.contains("<h1>RESULT SHEET</h1>"));
    assert!(html.contains("Asha Patil"));
}

#[test]
fn sheet_uncategorized_answers_fail() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(NASHIK)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 PASS, 1 FAIL, 0 not completed"));

    let csv =
        std::fs::read_to_string(dir.path().join(format!("result_sheet_{NASHIK}.csv"))).unwrap();
    assert!(csv.contains("Name of Assessor: Rohit Shah"));
    assert!(csv.contains("Module 1 Theory (15)"));
    assert!(csv.contains("QP Code & Name: MBJR"));
}

#[test]
fn sheet_defaults_to_configured_output_dir() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(PUNE)
        .assert()
        .success();

    assert!(dir
        .path()
        .join("resultsheet-results")
        .join(format!("result_sheet_{PUNE}.csv"))
        .exists());
}

#[test]
fn sheet_config_sets_assessor_and_title() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(
        &config,
        "assessing_body = \"State Skills Board\"\nreport_title = \"FINAL RESULT SHEET\"\n",
    )
    .unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(PUNE)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success();

    let csv = std::fs::read_to_string(dir.path().join(format!("result_sheet_{PUNE}.csv"))).unwrap();
    assert!(csv.starts_with("FINAL RESULT SHEET\nName of Assessing Body: State Skills Board\n"));
}

#[test]
fn sheet_requires_batch_when_ambiguous() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("choose one with --batch"));
}

#[test]
fn sheet_unknown_batch() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg("Nowhere")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no candidates found for batch 'Nowhere'"));
}

#[test]
fn sheet_unknown_scheme() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--batch")
        .arg(PUNE)
        .arg("--scheme")
        .arg("bogus")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scheme: bogus"));

    assert!(!dir.path().join(format!("result_sheet_{PUNE}.csv")).exists());
}

#[test]
fn sheet_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(sample("candidates.json"))
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'pdf'"));
}

#[test]
fn sheet_nonexistent_input() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn schemes_list() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("schemes")
        .assert()
        .success()
        .stdout(predicate::str::contains("mbjr"))
        .stdout(predicate::str::contains("sewage_treatment"))
        .stdout(predicate::str::contains("550"))
        .stdout(predicate::str::contains("3 scheme(s)"));
}

#[test]
fn schemes_detail() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("schemes")
        .arg("--scheme")
        .arg("pg")
        .assert()
        .success()
        .stdout(predicate::str::contains("DGT/VSQ/N0102"))
        .stdout(predicate::str::contains("Maximum marks: 310"));
}

#[test]
fn schemes_unknown() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("schemes")
        .arg("--scheme")
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scheme: bogus"));
}

#[test]
fn validate_builtin_schemes() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Schemes: 3"))
        .stdout(predicate::str::contains("All inputs valid"));
}

#[test]
fn validate_uses_explicit_config() {
    let dir = TempDir::new().unwrap();
    let schemes = dir.path().join("one-scheme.toml");
    std::fs::write(
        &schemes,
        "version = 1\n\n[[schemes]]\nid = \"solo\"\npass_threshold = 50\n\n[[schemes.units]]\ncode = \"U1\"\ntheory = 10\nviva = 0\npractical = 0\n",
    )
    .unwrap();
    let conf_dir = dir.path().join("conf");
    std::fs::create_dir_all(&conf_dir).unwrap();
    let config = conf_dir.join("custom.toml");
    std::fs::write(
        &config,
        format!("schemes_file = \"{}\"\n", schemes.display()),
    )
    .unwrap();

    resultsheet(&dir)
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Schemes: 1"))
        .stdout(predicate::str::contains("All inputs valid"));

    resultsheet(&dir)
        .arg("validate")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn validate_input_reports_skipped_answers() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("validate")
        .arg("--input")
        .arg(sample("candidates.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Candidates: 4 in 2 batch(es)"))
        .stdout(predicate::str::contains("XYZ/N9999"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_scheme_file_with_warnings() {
    let dir = TempDir::new().unwrap();
    let schemes = dir.path().join("schemes.toml");
    std::fs::write(
        &schemes,
        "version = 1\n\n[[schemes]]\nid = \"empty\"\npass_threshold = 50\n",
    )
    .unwrap();

    resultsheet(&dir)
        .arg("validate")
        .arg("--schemes")
        .arg(&schemes)
        .assert()
        .success()
        .stdout(predicate::str::contains("[empty] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_invalid_scheme_file() {
    let dir = TempDir::new().unwrap();
    let schemes = dir.path().join("schemes.toml");
    std::fs::write(&schemes, "version = 7\n").unwrap();

    resultsheet(&dir)
        .arg("validate")
        .arg("--schemes")
        .arg(&schemes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme configuration version 7"));
}

#[test]
fn import_then_sheet() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("candidates.json");

    resultsheet(&dir)
        .arg("import")
        .arg("--input")
        .arg(sample("bulk-upload.csv"))
        .arg("--output")
        .arg(&docs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 candidate(s)"));

    let imported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&docs).unwrap()).unwrap();
    assert_eq!(imported[2]["assessments"][0]["schemeName"], "pg");
    assert_eq!(imported[2]["assessments"][0]["status"], "to_be_requested");
    assert_eq!(
        imported[2]["assessments"][0]["assessmentAgency"]["assessorName"],
        "Rohit Shah"
    );

    // Freshly imported candidates have not been assessed yet.
    resultsheet(&dir)
        .arg("sheet")
        .arg("--input")
        .arg(&docs)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 PASS, 0 FAIL, 3 not completed"));
}

#[test]
fn import_refuses_invalid_upload() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("candidates.json");

    resultsheet(&dir)
        .arg("import")
        .arg("--input")
        .arg(sample("bulk-upload-invalid.json"))
        .arg("--output")
        .arg(&docs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate aadhar in upload"))
        .stderr(predicate::str::contains("missing candidateId or aadhar"))
        .stderr(predicate::str::contains(
            "2 of 3 candidates could not be processed",
        ));

    assert!(!docs.exists());
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created resultsheet.toml"))
        .stdout(predicate::str::contains("Created schemes.toml"));

    assert!(dir.path().join("resultsheet.toml").exists());
    assert!(dir.path().join("schemes.toml").exists());

    // The generated config points at the generated scheme file.
    resultsheet(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Schemes: 3"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir).arg("init").assert().success();

    resultsheet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("result sheet generator"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();

    resultsheet(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("resultsheet"));
}
