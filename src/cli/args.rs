//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AnalysisConfig, BayesConfig};

/// Brandlift - Estimate brand lift from a randomized exposure survey
#[derive(Parser, Debug)]
#[command(name = "brandlift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Long-format survey CSV with respondent, panel group, question and
    /// response columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// KPI configuration JSON mapping KPI names to question id lists
    #[arg(short, long)]
    pub kpi_config: PathBuf,

    /// Question id whose responses define the binary purchase outcome
    #[arg(long, default_value = "Q2")]
    pub outcome_question: String,

    /// Response label (case-insensitive) counted as a positive outcome
    #[arg(long, default_value = "very likely")]
    pub positive_response: String,

    /// Drop columns whose fraction of missing values exceeds this threshold
    #[arg(long, default_value = "0.9", value_parser = validate_fraction)]
    pub missing_threshold: f64,

    /// Columns never dropped by the missingness filter (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub protect_columns: Vec<String>,

    /// Significance level for the FDR-corrected tests
    #[arg(long, default_value = "0.05", value_parser = validate_fraction)]
    pub fdr_alpha: f64,

    /// Number of bootstrap resamples for the AIPW confidence interval
    #[arg(long, default_value = "500")]
    pub bootstrap_iterations: usize,

    /// Seed for bootstrap resampling and posterior sampling
    #[arg(long, default_value = "123")]
    pub seed: u64,

    /// Skip the Bayesian estimator (reported as unavailable)
    #[arg(long, default_value = "false")]
    pub no_bayes: bool,

    /// Write the full results object to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Translate CLI flags into the pipeline configuration.
    pub fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            missing_threshold: self.missing_threshold,
            protected_columns: self.protect_columns.clone(),
            outcome_question: self.outcome_question.clone(),
            positive_response: self.positive_response.clone(),
            fdr_alpha: self.fdr_alpha,
            bootstrap_iterations: self.bootstrap_iterations,
            seed: self.seed,
            bayes: BayesConfig {
                enabled: !self.no_bayes,
                ..BayesConfig::default()
            },
            ..AnalysisConfig::default()
        }
    }
}

/// Validator for parameters constrained to [0, 1]
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("value must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}
