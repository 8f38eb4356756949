//! Analysis configuration.
//!
//! Every tunable of the pipeline lives here as a named field with an explicit
//! default, so callers construct one configuration object and pass it down
//! rather than relying on ambient constants.

use serde::{Deserialize, Serialize};

/// Settings for the optional Bayesian logistic estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesConfig {
    /// Whether to run the Bayesian estimator at all. When false the
    /// estimate is reported as unavailable.
    pub enabled: bool,
    /// Number of independent sampling chains.
    pub chains: usize,
    /// Posterior draws kept per chain (after tuning).
    pub draws: usize,
    /// Tuning draws discarded per chain; step size adapts only here.
    pub tune: usize,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chains: 2,
            draws: 500,
            tune: 500,
        }
    }
}

/// Configuration for a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Drop columns whose fraction of null values exceeds this threshold.
    pub missing_threshold: f64,
    /// Columns never dropped by the missingness filter, regardless of
    /// their null fraction.
    pub protected_columns: Vec<String>,
    /// Question id whose responses define the binary outcome.
    pub outcome_question: String,
    /// Response label (case-insensitive) that marks the outcome as 1.
    pub positive_response: String,
    /// Significance level for the FDR-corrected tests.
    pub fdr_alpha: f64,
    /// Number of bootstrap resamples for the AIPW confidence interval.
    pub bootstrap_iterations: usize,
    /// L2 penalty for the ridge outcome models (intercept unpenalized).
    pub ridge_lambda: f64,
    /// L2 penalty for the logistic propensity model.
    pub propensity_penalty: f64,
    /// Seed for all stochastic steps (bootstrap, posterior sampling).
    pub seed: u64,
    /// Bayesian estimator settings.
    pub bayes: BayesConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            missing_threshold: 0.9,
            protected_columns: Vec::new(),
            outcome_question: "Q2".to_string(),
            positive_response: "very likely".to_string(),
            fdr_alpha: 0.05,
            bootstrap_iterations: 500,
            ridge_lambda: 1.0,
            propensity_penalty: 1.0,
            seed: 123,
            bayes: BayesConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Convenience constructor with the Bayesian estimator switched off.
    pub fn without_bayes() -> Self {
        Self {
            bayes: BayesConfig {
                enabled: false,
                ..BayesConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_settings() {
        let config = AnalysisConfig::default();
        assert_eq!(config.missing_threshold, 0.9);
        assert_eq!(config.outcome_question, "Q2");
        assert_eq!(config.bootstrap_iterations, 500);
        assert_eq!(config.fdr_alpha, 0.05);
        assert!(config.bayes.enabled);
        assert_eq!(config.bayes.chains, 2);
    }

    #[test]
    fn test_without_bayes() {
        let config = AnalysisConfig::without_bayes();
        assert!(!config.bayes.enabled);
        assert_eq!(config.bayes.draws, 500);
    }
}
