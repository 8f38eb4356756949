//! Schema validation tests: required columns, alias normalization,
//! respondent-level assignment consistency, KPI coverage.

use brandlift::error::AnalysisError;
use brandlift::pipeline::{validate_schema, KpiMap};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn kpis() -> KpiMap {
    common::purchase_intent_kpis()
}

#[test]
fn test_each_alias_normalizes() {
    for alias in ["Panel Group", "Panel group", "Panel_Group", "panel_group"] {
        let mut df = df! {
            "Respondent_ID" => ["R1", "R2"],
            "Question_ID" => ["Q2", "Q2"],
            "Response_Code" => ["Very Likely", "Not Likely"],
        }
        .unwrap();
        df.with_column(Column::new(alias.into(), vec!["Exposed", "Control"]))
            .unwrap();

        validate_schema(&mut df, &kpis()).unwrap();
        assert!(
            df.column("panel_group").is_ok(),
            "alias '{}' was not normalized",
            alias
        );
    }
}

#[test]
fn test_required_columns_enforced() {
    for missing in ["Respondent_ID", "Question_ID", "Response_Code"] {
        let mut df = df! {
            "Respondent_ID" => ["R1"],
            "panel_group" => ["Exposed"],
            "Question_ID" => ["Q2"],
            "Response_Code" => ["Very Likely"],
        }
        .unwrap();
        df = df.drop(missing).unwrap();

        let result = validate_schema(&mut df, &kpis());
        assert!(
            matches!(result, Err(AnalysisError::MissingColumn { column }) if column == missing),
            "dropping '{}' should be fatal",
            missing
        );
    }
}

#[test]
fn test_consistent_respondents_pass() {
    let mut df = df! {
        "Respondent_ID" => ["R1", "R1", "R2", "R2"],
        "panel_group" => ["Exposed", "Exposed", "Control", "Control"],
        "Question_ID" => ["Q1", "Q2", "Q1", "Q2"],
        "Response_Code" => ["Yes", "Very Likely", "No", "Not Likely"],
    }
    .unwrap();

    assert!(validate_schema(&mut df, &kpis()).is_ok());
}

#[test]
fn test_cross_panel_respondent_rejected() {
    let mut df = df! {
        "Respondent_ID" => ["R1", "R2", "R1"],
        "panel_group" => ["Exposed", "Control", "Control"],
        "Question_ID" => ["Q1", "Q2", "Q2"],
        "Response_Code" => ["Yes", "Not Likely", "Very Likely"],
    }
    .unwrap();

    let result = validate_schema(&mut df, &kpis());
    assert!(matches!(
        result,
        Err(AnalysisError::InconsistentAssignment { respondent, .. }) if respondent == "R1"
    ));
}

#[test]
fn test_coverage_lists_every_configured_pair() {
    let mut df = df! {
        "Respondent_ID" => ["R1", "R2"],
        "panel_group" => ["Exposed", "Control"],
        "Question_ID" => ["Q2", "Q2"],
        "Response_Code" => ["Very Likely", "Not Likely"],
    }
    .unwrap();
    let map = KpiMap::from_entries(vec![
        ("Purchase Intent".to_string(), vec!["Q2".to_string()]),
        (
            "Awareness".to_string(),
            vec!["Q1".to_string(), "Q2".to_string()],
        ),
    ])
    .unwrap();

    let coverage = validate_schema(&mut df, &map).unwrap();
    assert_eq!(coverage.entries.len(), 3);
    assert_eq!(coverage.missing_questions(), vec!["Q1"]);
    let found: Vec<bool> = coverage.entries.iter().map(|e| e.found).collect();
    assert_eq!(found, vec![true, false, true]);
}
