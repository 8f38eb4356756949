//! CLI smoke tests via the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn write_fixture(dir: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let survey = dir.path().join("survey.csv");
    let mut file = std::fs::File::create(&survey).unwrap();
    writeln!(file, "Respondent_ID,Panel Group,Question_ID,Response_Code").unwrap();
    for i in 0..60 {
        let response = if i < 40 { "Very Likely" } else { "Not Likely" };
        writeln!(file, "E{},Exposed,Q2,{}", i, response).unwrap();
    }
    for i in 0..60 {
        let response = if i < 20 { "Very Likely" } else { "Not Likely" };
        writeln!(file, "C{},Control,Q2,{}", i, response).unwrap();
    }

    let kpi = dir.path().join("kpi.json");
    std::fs::write(
        &kpi,
        r#"{"kpi_mappings": {"Purchase Intent": ["Q2"]}}"#,
    )
    .unwrap();

    (survey, kpi)
}

#[test]
fn test_help_shows_usage() {
    Command::cargo_bin("brandlift")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--kpi-config"));
}

#[test]
fn test_missing_input_fails() {
    Command::cargo_bin("brandlift").unwrap().assert().failure();
}

#[test]
fn test_full_run_writes_results() {
    let dir = tempfile::TempDir::new().unwrap();
    let (survey, kpi) = write_fixture(&dir);
    let output = dir.path().join("results.json");

    Command::cargo_bin("brandlift")
        .unwrap()
        .args([
            "--input",
            survey.to_str().unwrap(),
            "--kpi-config",
            kpi.to_str().unwrap(),
            "--no-bayes",
            "--bootstrap-iterations",
            "100",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("AIPW"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert!(json["causal"]["ate_aipw"].as_f64().unwrap() > 0.1);
    assert!(json["causal"]["bayes"].is_null());
    assert_eq!(json["kpi_summaries"][0]["kpi"], "Purchase Intent");
}

#[test]
fn test_missing_column_is_clear_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let survey = dir.path().join("bad.csv");
    let mut file = std::fs::File::create(&survey).unwrap();
    writeln!(file, "Question_ID,Response_Code").unwrap();
    writeln!(file, "Q2,Very Likely").unwrap();
    let kpi = dir.path().join("kpi.json");
    std::fs::write(&kpi, r#"{"kpi_mappings": {"Purchase Intent": ["Q2"]}}"#).unwrap();

    Command::cargo_bin("brandlift")
        .unwrap()
        .args([
            "--input",
            survey.to_str().unwrap(),
            "--kpi-config",
            kpi.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("panel group"));
}
