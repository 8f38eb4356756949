//! Per-question significance testing with multiple-comparison correction.
//!
//! Every question referenced in the KPI map gets an association test between
//! panel group and response category. Small 2x2 tables switch from the
//! chi-square test to Fisher's exact test. All defined p-values are then
//! corrected in one Benjamini-Hochberg batch.

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::clean::CleanedTable;
use crate::pipeline::contingency::{chi_square, fisher_exact, ContingencyTable};
use crate::pipeline::fdr::benjamini_hochberg;
use crate::pipeline::schema::KpiMap;

/// Expected cell count below which a 2x2 table switches to the exact test.
const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Which association test produced a question's p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestVariant {
    /// Chi-square test of independence
    ChiSquare,
    /// Fisher's exact test (small 2x2 table)
    FisherExact,
    /// No rows (or a degenerate table) for this question
    NoData,
}

impl std::fmt::Display for TestVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestVariant::ChiSquare => write!(f, "Chi-Square"),
            TestVariant::FisherExact => write!(f, "Fisher"),
            TestVariant::NoData => write!(f, "None"),
        }
    }
}

/// Test outcome for a single question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionTest {
    /// Question id
    pub question: String,
    /// Test variant used
    pub variant: TestVariant,
    /// Chi-square statistic (also recorded when the exact test supersedes
    /// the p-value); `None` without data
    pub statistic: Option<f64>,
    /// Raw p-value from the recorded variant
    pub p_value: Option<f64>,
    /// Benjamini-Hochberg corrected p-value; `None` when the raw p is
    /// undefined
    pub p_corrected: Option<f64>,
}

impl QuestionTest {
    /// Significant iff the corrected p-value is defined and below alpha.
    pub fn is_significant(&self, alpha: f64) -> bool {
        matches!(self.p_corrected, Some(p) if p < alpha)
    }
}

/// Run the association test for every question in the KPI map and apply the
/// FDR correction across all defined p-values.
pub fn run_significance_tests(
    table: &CleanedTable,
    kpis: &KpiMap,
    config: &AnalysisConfig,
) -> Result<Vec<QuestionTest>, AnalysisError> {
    let questions = table.questions()?;
    let panels = table.panel_groups()?;
    let responses = table.responses()?;

    let mut results = Vec::new();
    for question in kpis.unique_questions() {
        let pairs: Vec<(Option<String>, Option<String>)> = questions
            .iter()
            .zip(panels.iter().zip(responses.iter()))
            .filter(|(q, _)| q.as_deref() == Some(question.as_str()))
            .map(|(_, (panel, response))| (panel.clone(), response.clone()))
            .collect();

        results.push(test_question(question, &pairs));
    }

    apply_correction(&mut results);

    let significant = results
        .iter()
        .filter(|r| r.is_significant(config.fdr_alpha))
        .count();
    debug!(
        "Tested {} questions, {} significant after correction",
        results.len(),
        significant
    );

    Ok(results)
}

/// Test one question's contingency table, switching to the exact test when
/// a 2x2 table has a low expected cell count.
fn test_question(question: String, pairs: &[(Option<String>, Option<String>)]) -> QuestionTest {
    let no_data = |question: String| QuestionTest {
        question,
        variant: TestVariant::NoData,
        statistic: None,
        p_value: None,
        p_corrected: None,
    };

    let Some(table) = ContingencyTable::from_pairs(pairs) else {
        return no_data(question);
    };
    let Some(chi) = chi_square(&table) else {
        return no_data(question);
    };

    if table.is_two_by_two() && chi.min_expected < MIN_EXPECTED_COUNT {
        if let Some(p_exact) = fisher_exact(&table) {
            // Exact p supersedes; the chi-square statistic stays on record.
            return QuestionTest {
                question,
                variant: TestVariant::FisherExact,
                statistic: Some(chi.statistic),
                p_value: Some(p_exact),
                p_corrected: None,
            };
        }
    }

    QuestionTest {
        question,
        variant: TestVariant::ChiSquare,
        statistic: Some(chi.statistic),
        p_value: Some(chi.p_value),
        p_corrected: None,
    }
}

/// Correct all defined p-values in one batch; undefined values stay
/// undefined.
fn apply_correction(results: &mut [QuestionTest]) {
    let defined: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.p_value.map(|p| (i, p)))
        .collect();
    if defined.is_empty() {
        return;
    }

    let raw: Vec<f64> = defined.iter().map(|(_, p)| *p).collect();
    let corrected = benjamini_hochberg(&raw);
    for ((idx, _), p_corrected) in defined.iter().zip(corrected) {
        results[*idx].p_corrected = Some(p_corrected);
    }
}
