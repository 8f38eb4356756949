//! Survey schema validation.
//!
//! Confirms the raw table and the KPI configuration are usable before any
//! analysis begins: required columns present, treatment-group column
//! normalized to its canonical name, respondent-level treatment assignment
//! consistent, and every configured question id checked against the data.
//! All failures here are fatal; there is no safe default survey structure.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::AnalysisError;

/// Canonical respondent identifier column.
pub const RESPONDENT_COL: &str = "Respondent_ID";
/// Canonical question identifier column.
pub const QUESTION_COL: &str = "Question_ID";
/// Canonical response label column.
pub const RESPONSE_COL: &str = "Response_Code";
/// Canonical treatment-group column after normalization.
pub const PANEL_COL: &str = "panel_group";
/// Accepted spellings of the treatment-group column on input.
pub const PANEL_ALIASES: [&str; 4] = ["Panel Group", "panel_group", "Panel group", "Panel_Group"];

/// Panel group label for treated respondents.
pub const EXPOSED_LABEL: &str = "Exposed";
/// Panel group label for control respondents.
pub const CONTROL_LABEL: &str = "Control";

/// Ordered mapping from KPI name to the question ids that measure it.
#[derive(Debug, Clone, Serialize)]
pub struct KpiMap {
    entries: Vec<(String, Vec<String>)>,
}

impl KpiMap {
    /// Build a KPI map, rejecting empty configurations.
    pub fn from_entries(entries: Vec<(String, Vec<String>)>) -> Result<Self, AnalysisError> {
        if entries.is_empty() {
            return Err(AnalysisError::EmptyKpiMap);
        }
        for (kpi, questions) in &entries {
            if questions.is_empty() {
                return Err(AnalysisError::KpiWithoutQuestions { kpi: kpi.clone() });
            }
        }
        Ok(Self { entries })
    }

    /// Iterate KPIs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(kpi, questions)| (kpi.as_str(), questions.as_slice()))
    }

    /// All referenced question ids, deduplicated, in first-seen order.
    pub fn unique_questions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut questions = Vec::new();
        for (_, q_ids) in &self.entries {
            for q_id in q_ids {
                if seen.insert(q_id.clone()) {
                    questions.push(q_id.clone());
                }
            }
        }
        questions
    }

    /// Number of configured KPIs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no KPIs. Never true for a constructed map.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a configured question id was found in the survey data.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionCoverage {
    /// KPI the question belongs to
    pub kpi: String,
    /// Question id from the KPI configuration
    pub question: String,
    /// True when at least one response row exists for the question
    pub found: bool,
}

/// Per-(KPI, question) presence report produced by validation.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    /// One entry per configured (KPI, question) pair
    pub entries: Vec<QuestionCoverage>,
}

impl CoverageReport {
    /// Question ids configured but absent from the data.
    pub fn missing_questions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.found)
            .map(|e| e.question.as_str())
            .collect()
    }
}

/// Convert any column to per-row optional strings for label comparison.
pub(crate) fn column_as_strings(col: &Column) -> Result<Vec<Option<String>>, AnalysisError> {
    let cast = col.cast(&DataType::String)?;
    let values = cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Validate the survey table and KPI configuration.
///
/// Renames the treatment-group column to [`PANEL_COL`] in place when it is
/// present under an alias. Returns the KPI coverage report on success.
pub fn validate_schema(
    df: &mut DataFrame,
    kpis: &KpiMap,
) -> Result<CoverageReport, AnalysisError> {
    normalize_panel_column(df)?;

    for column in [RESPONDENT_COL, QUESTION_COL, RESPONSE_COL] {
        if df.column(column).is_err() {
            return Err(AnalysisError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    check_assignment_consistency(df)?;

    let coverage = check_question_coverage(df, kpis)?;
    let missing = coverage.missing_questions();
    if !missing.is_empty() {
        info!(
            "Configured questions absent from survey data: {}",
            missing.join(", ")
        );
    }

    Ok(coverage)
}

/// Find the treatment-group column under a known alias and rename it to the
/// canonical name.
fn normalize_panel_column(df: &mut DataFrame) -> Result<(), AnalysisError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let found = PANEL_ALIASES
        .iter()
        .find(|alias| names.iter().any(|n| n == *alias));

    match found {
        Some(&alias) => {
            if alias != PANEL_COL {
                df.rename(alias, PANEL_COL.into())?;
                info!("Renamed '{}' to '{}'", alias, PANEL_COL);
            }
            Ok(())
        }
        None => Err(AnalysisError::NoPanelGroupColumn {
            aliases: PANEL_ALIASES.join(", "),
        }),
    }
}

/// Reject tables where a respondent carries more than one panel group value.
fn check_assignment_consistency(df: &DataFrame) -> Result<(), AnalysisError> {
    let respondents = column_as_strings(df.column(RESPONDENT_COL)?)?;
    let panels = column_as_strings(df.column(PANEL_COL)?)?;

    let mut assigned: HashMap<String, String> = HashMap::new();
    for (respondent, panel) in respondents.iter().zip(panels.iter()) {
        let (Some(respondent), Some(panel)) = (respondent, panel) else {
            continue;
        };
        match assigned.get(respondent) {
            Some(existing) if existing != panel => {
                return Err(AnalysisError::InconsistentAssignment {
                    respondent: respondent.clone(),
                    groups: format!("{}, {}", existing, panel),
                });
            }
            Some(_) => {}
            None => {
                assigned.insert(respondent.clone(), panel.clone());
            }
        }
    }
    Ok(())
}

/// Report, per configured (KPI, question), whether the question id occurs in
/// the data. Absent questions are reported, never silently ignored.
fn check_question_coverage(
    df: &DataFrame,
    kpis: &KpiMap,
) -> Result<CoverageReport, AnalysisError> {
    let present: HashSet<String> = column_as_strings(df.column(QUESTION_COL)?)?
        .into_iter()
        .flatten()
        .collect();

    let mut entries = Vec::new();
    for (kpi, questions) in kpis.iter() {
        for question in questions {
            entries.push(QuestionCoverage {
                kpi: kpi.to_string(),
                question: question.clone(),
                found: present.contains(question),
            });
        }
    }
    Ok(CoverageReport { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis() -> KpiMap {
        KpiMap::from_entries(vec![
            ("Purchase Intent".to_string(), vec!["Q2".to_string()]),
            (
                "Brand Awareness".to_string(),
                vec!["Q1".to_string(), "Q2".to_string()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_kpi_map_rejected() {
        let result = KpiMap::from_entries(Vec::new());
        assert!(matches!(result, Err(AnalysisError::EmptyKpiMap)));
    }

    #[test]
    fn test_kpi_without_questions_rejected() {
        let result = KpiMap::from_entries(vec![("Awareness".to_string(), Vec::new())]);
        assert!(matches!(
            result,
            Err(AnalysisError::KpiWithoutQuestions { .. })
        ));
    }

    #[test]
    fn test_unique_questions_preserves_first_seen_order() {
        let questions = kpis().unique_questions();
        assert_eq!(questions, vec!["Q2".to_string(), "Q1".to_string()]);
    }

    #[test]
    fn test_alias_renamed_to_canonical() {
        let mut df = df! {
            "Respondent_ID" => ["R1", "R2"],
            "Panel Group" => ["Control", "Exposed"],
            "Question_ID" => ["Q2", "Q2"],
            "Response_Code" => ["Very Likely", "Not Likely"],
        }
        .unwrap();

        validate_schema(&mut df, &kpis()).unwrap();
        assert!(df.column(PANEL_COL).is_ok());
        assert!(df.column("Panel Group").is_err());
    }

    #[test]
    fn test_missing_respondent_column_fatal() {
        let mut df = df! {
            "panel_group" => ["Control", "Exposed"],
            "Question_ID" => ["Q2", "Q2"],
            "Response_Code" => ["Very Likely", "Not Likely"],
        }
        .unwrap();

        let result = validate_schema(&mut df, &kpis());
        assert!(matches!(
            result,
            Err(AnalysisError::MissingColumn { column }) if column == RESPONDENT_COL
        ));
    }

    #[test]
    fn test_missing_panel_column_fatal() {
        let mut df = df! {
            "Respondent_ID" => ["R1", "R2"],
            "Question_ID" => ["Q2", "Q2"],
            "Response_Code" => ["Very Likely", "Not Likely"],
        }
        .unwrap();

        let result = validate_schema(&mut df, &kpis());
        assert!(matches!(
            result,
            Err(AnalysisError::NoPanelGroupColumn { .. })
        ));
    }

    #[test]
    fn test_inconsistent_assignment_rejected() {
        let mut df = df! {
            "Respondent_ID" => ["R1", "R1"],
            "panel_group" => ["Control", "Exposed"],
            "Question_ID" => ["Q1", "Q2"],
            "Response_Code" => ["Yes", "Very Likely"],
        }
        .unwrap();

        let result = validate_schema(&mut df, &kpis());
        assert!(matches!(
            result,
            Err(AnalysisError::InconsistentAssignment { respondent, .. }) if respondent == "R1"
        ));
    }

    #[test]
    fn test_coverage_reports_missing_question() {
        let mut df = df! {
            "Respondent_ID" => ["R1", "R2"],
            "panel_group" => ["Control", "Exposed"],
            "Question_ID" => ["Q2", "Q2"],
            "Response_Code" => ["Very Likely", "Not Likely"],
        }
        .unwrap();

        let coverage = validate_schema(&mut df, &kpis()).unwrap();
        assert_eq!(coverage.missing_questions(), vec!["Q1"]);
    }

    #[test]
    fn test_numeric_respondent_ids_supported() {
        let mut df = df! {
            "Respondent_ID" => [1i64, 1, 2],
            "panel_group" => ["Control", "Control", "Exposed"],
            "Question_ID" => ["Q1", "Q2", "Q2"],
            "Response_Code" => ["Yes", "Very Likely", "Not Likely"],
        }
        .unwrap();

        assert!(validate_schema(&mut df, &kpis()).is_ok());
    }
}
