//! Per-KPI aggregation and data-quality summary.
//!
//! Merges the per-question significance outcomes with the headline AIPW
//! estimate into one summary record per KPI. This structure, not the
//! intermediate test and estimate objects, is the contract handed to
//! downstream reporting.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::AnalysisError;
use crate::pipeline::causal::CausalEstimates;
use crate::pipeline::clean::CleanedTable;
use crate::pipeline::schema::{KpiMap, CONTROL_LABEL, EXPOSED_LABEL};
use crate::pipeline::significance::QuestionTest;

/// Aggregated summary for one KPI.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    /// KPI name
    pub kpi: String,
    /// Question ids measuring this KPI, in configuration order
    pub questions: Vec<String>,
    /// Per-question significance labels, `"<question>: <label>"`
    pub significance: Vec<String>,
    /// Headline AIPW ATE in percentage points
    pub ate_aipw_pct: f64,
    /// Bootstrap interval lower bound in percentage points
    pub ci_lower_pct: f64,
    /// Bootstrap interval upper bound in percentage points
    pub ci_upper_pct: f64,
    /// One-line reading of the headline estimate
    pub interpretation: String,
}

/// Human-readable significance label for a question's test outcome.
pub fn significance_label(test: &QuestionTest, alpha: f64) -> String {
    match test.p_corrected {
        None => "No data".to_string(),
        Some(p) if p < alpha => format!("Significant improvement (adj p={})", format_p(p)),
        Some(_) => "Not significant after correction".to_string(),
    }
}

fn format_p(p: f64) -> String {
    if p < 0.001 {
        format!("{:.2e}", p)
    } else {
        format!("{:.3}", p)
    }
}

/// Build one summary record per KPI.
pub fn aggregate(
    kpis: &KpiMap,
    tests: &[QuestionTest],
    causal: &CausalEstimates,
    alpha: f64,
) -> Vec<KpiSummary> {
    let ate_pct = causal.ate_aipw * 100.0;
    let lower_pct = causal.aipw_interval.lower * 100.0;
    let upper_pct = causal.aipw_interval.upper * 100.0;
    let interpretation = if ate_pct > 0.0 {
        "Positive lift observed"
    } else {
        "No clear lift"
    };

    kpis.iter()
        .map(|(kpi, questions)| {
            let significance = questions
                .iter()
                .map(|question| {
                    let label = tests
                        .iter()
                        .find(|t| &t.question == question)
                        .map(|t| significance_label(t, alpha))
                        .unwrap_or_else(|| "No data".to_string());
                    format!("{}: {}", question, label)
                })
                .collect();

            KpiSummary {
                kpi: kpi.to_string(),
                questions: questions.to_vec(),
                significance,
                ate_aipw_pct: ate_pct,
                ci_lower_pct: lower_pct,
                ci_upper_pct: upper_pct,
                interpretation: interpretation.to_string(),
            }
        })
        .collect()
}

/// Respondent counts and completion statistics for the cleaned survey.
#[derive(Debug, Clone, Serialize)]
pub struct DataQuality {
    /// Distinct respondents in the cleaned table
    pub total_respondents: usize,
    /// Distinct respondents in the Control arm
    pub control_respondents: usize,
    /// Distinct respondents in the Exposed arm
    pub exposed_respondents: usize,
    /// Share of respondents who answered at least one KPI question (%)
    pub completion_rate_pct: f64,
    /// Columns removed by the missingness filter
    pub dropped_columns: Vec<String>,
}

/// Compute the data-quality summary.
pub fn data_quality(table: &CleanedTable, kpis: &KpiMap) -> Result<DataQuality, AnalysisError> {
    let respondents = table.respondents()?;
    let panels = table.panel_groups()?;
    let questions = table.questions()?;

    let kpi_questions: HashSet<String> = kpis.unique_questions().into_iter().collect();

    let mut all: HashSet<&str> = HashSet::new();
    let mut control: HashSet<&str> = HashSet::new();
    let mut exposed: HashSet<&str> = HashSet::new();
    let mut answered: HashSet<&str> = HashSet::new();

    for i in 0..respondents.len() {
        let Some(respondent) = respondents[i].as_deref() else {
            continue;
        };
        all.insert(respondent);
        match panels[i].as_deref() {
            Some(CONTROL_LABEL) => {
                control.insert(respondent);
            }
            Some(EXPOSED_LABEL) => {
                exposed.insert(respondent);
            }
            _ => {}
        }
        if let Some(question) = questions[i].as_deref() {
            if kpi_questions.contains(question) {
                answered.insert(respondent);
            }
        }
    }

    let completion_rate_pct = if all.is_empty() {
        0.0
    } else {
        answered.len() as f64 / all.len() as f64 * 100.0
    };

    Ok(DataQuality {
        total_respondents: all.len(),
        control_respondents: control.len(),
        exposed_respondents: exposed.len(),
        completion_rate_pct,
        dropped_columns: table.dropped_columns().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::causal::bootstrap::BootstrapInterval;
    use crate::pipeline::significance::TestVariant;

    fn causal(ate: f64) -> CausalEstimates {
        CausalEstimates {
            ate_aipw: ate,
            aipw_interval: BootstrapInterval {
                lower: ate - 0.05,
                upper: ate + 0.05,
            },
            ate_t_learner: ate,
            ate_x_learner: ate,
            bayes: None,
        }
    }

    fn test_record(question: &str, p_corrected: Option<f64>) -> QuestionTest {
        QuestionTest {
            question: question.to_string(),
            variant: if p_corrected.is_some() {
                TestVariant::ChiSquare
            } else {
                TestVariant::NoData
            },
            statistic: p_corrected.map(|_| 4.2),
            p_value: p_corrected,
            p_corrected,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            significance_label(&test_record("Q2", Some(0.003)), 0.05),
            "Significant improvement (adj p=0.003)"
        );
        assert_eq!(
            significance_label(&test_record("Q2", Some(0.2)), 0.05),
            "Not significant after correction"
        );
        assert_eq!(significance_label(&test_record("Q2", None), 0.05), "No data");
    }

    #[test]
    fn test_aggregate_one_record_per_kpi() {
        let kpis = KpiMap::from_entries(vec![
            ("Purchase Intent".to_string(), vec!["Q2".to_string()]),
            (
                "Awareness".to_string(),
                vec!["Q1".to_string(), "Q3".to_string()],
            ),
        ])
        .unwrap();
        let tests = vec![
            test_record("Q2", Some(0.01)),
            test_record("Q1", Some(0.4)),
            test_record("Q3", None),
        ];

        let summaries = aggregate(&kpis, &tests, &causal(0.31), 0.05);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kpi, "Purchase Intent");
        assert!((summaries[0].ate_aipw_pct - 31.0).abs() < 1e-9);
        assert_eq!(summaries[0].interpretation, "Positive lift observed");
        assert_eq!(summaries[1].significance.len(), 2);
        assert!(summaries[1].significance[1].ends_with("No data"));
    }

    #[test]
    fn test_negative_ate_interpretation() {
        let kpis =
            KpiMap::from_entries(vec![("KPI".to_string(), vec!["Q2".to_string()])]).unwrap();
        let summaries = aggregate(&kpis, &[test_record("Q2", Some(0.5))], &causal(-0.02), 0.05);
        assert_eq!(summaries[0].interpretation, "No clear lift");
    }
}
