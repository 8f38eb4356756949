//! Analysis pipeline - validation, cleaning, testing, and estimation.
//!
//! Control flow: schema validation, then cleaning, then the significance
//! tests and the causal estimator (independent of each other), then
//! aggregation into the results object.

pub mod causal;
pub mod clean;
pub mod contingency;
pub mod covariates;
pub mod fdr;
pub mod schema;
pub mod significance;

pub use causal::{estimate_effects, CausalEstimates, ScoredTable};
pub use clean::{clean, CleanedTable, OUTCOME_COL};
pub use covariates::{build_covariates, CovariateMatrix};
pub use schema::{validate_schema, CoverageReport, KpiMap};
pub use significance::{run_significance_tests, QuestionTest, TestVariant};

use polars::prelude::DataFrame;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::report::{aggregate, data_quality, AnalysisResults};

/// Run the full analysis over an in-memory survey table.
///
/// Fatal preconditions surface as [`AnalysisError`]; recoverable gaps
/// (questions without data, an unavailable Bayesian fit) are explicit
/// markers inside the returned results object.
pub fn run_analysis(
    mut df: DataFrame,
    kpis: &KpiMap,
    config: &AnalysisConfig,
) -> Result<AnalysisResults, AnalysisError> {
    info!("Validating schema ({} rows)", df.height());
    let coverage = validate_schema(&mut df, kpis)?;

    info!("Cleaning data");
    let cleaned = clean(&df, config)?;

    info!("Running significance tests");
    let question_tests = run_significance_tests(&cleaned, kpis, config)?;

    info!("Estimating causal effects");
    let covariate_matrix = build_covariates(&cleaned)?;
    let causal = estimate_effects(&cleaned, &covariate_matrix, config)?;

    info!("Aggregating results");
    let quality = data_quality(&cleaned, kpis)?;
    let kpi_summaries = aggregate(kpis, &question_tests, &causal, config.fdr_alpha);

    Ok(AnalysisResults {
        coverage,
        question_tests,
        causal,
        kpi_summaries,
        data_quality: quality,
    })
}
