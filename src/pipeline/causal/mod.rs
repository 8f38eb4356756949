//! Causal effect estimation.
//!
//! Fits the propensity and per-arm outcome models once, freezes the
//! per-row scores in a [`ScoredTable`], and derives four independent ATE
//! estimates from it: AIPW (headline, doubly robust), T-learner,
//! X-learner, and the optional Bayesian logistic model.

pub mod bayes;
pub mod bootstrap;
pub mod learners;
pub mod outcome;
pub mod propensity;

use serde::Serialize;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::clean::CleanedTable;
use crate::pipeline::covariates::CovariateMatrix;
use crate::pipeline::schema::{CONTROL_LABEL, EXPOSED_LABEL};

use bayes::BayesEstimate;
use bootstrap::BootstrapInterval;

/// Frozen per-row arrays after model fitting. Everything downstream —
/// AIPW, its bootstrap, the learners — reads from this value and never
/// mutates it.
#[derive(Debug, Clone)]
pub struct ScoredTable {
    /// Treatment indicator per row
    pub w: Vec<f64>,
    /// Binary outcome per row
    pub y: Vec<f64>,
    /// Propensity score per row, strictly inside (0, 1)
    pub ps: Vec<f64>,
    /// Exposed-arm outcome model prediction per row
    pub mu1: Vec<f64>,
    /// Control-arm outcome model prediction per row
    pub mu0: Vec<f64>,
}

impl ScoredTable {
    /// Doubly-robust pseudo-outcome per row:
    /// `W(Y - mu1)/ps - (1 - W)(Y - mu0)/(1 - ps) + (mu1 - mu0)`.
    pub fn aipw_scores(&self) -> Vec<f64> {
        (0..self.w.len())
            .map(|i| {
                let w = self.w[i];
                let y = self.y[i];
                let ps = self.ps[i];
                let mu1 = self.mu1[i];
                let mu0 = self.mu0[i];
                w * (y - mu1) / ps - (1.0 - w) * (y - mu0) / (1.0 - ps) + (mu1 - mu0)
            })
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.w.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.w.is_empty()
    }
}

/// Point estimates and interval bounds from all estimators. A value
/// object: produced once per run, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CausalEstimates {
    /// Headline doubly-robust ATE
    pub ate_aipw: f64,
    /// 95% bootstrap interval for the AIPW estimate
    pub aipw_interval: BootstrapInterval,
    /// T-learner ATE
    pub ate_t_learner: f64,
    /// X-learner ATE
    pub ate_x_learner: f64,
    /// Bayesian posterior estimate of tau; `None` when disabled or failed
    pub bayes: Option<BayesEstimate>,
}

/// Fit all models and compute the causal estimate bundle.
pub fn estimate_effects(
    table: &CleanedTable,
    covariates: &CovariateMatrix,
    config: &AnalysisConfig,
) -> Result<CausalEstimates, AnalysisError> {
    let w = table.treatment()?;
    let y = table.outcomes()?;

    let exposed_rows: Vec<usize> = indices_where(&w, |v| v > 0.5);
    let control_rows: Vec<usize> = indices_where(&w, |v| v <= 0.5);
    if exposed_rows.is_empty() {
        return Err(AnalysisError::EmptyArm {
            group: EXPOSED_LABEL.to_string(),
        });
    }
    if control_rows.is_empty() {
        return Err(AnalysisError::EmptyArm {
            group: CONTROL_LABEL.to_string(),
        });
    }

    let x = covariates.matrix();
    let ps = propensity::fit_propensity(x, &w, config.propensity_penalty)?;
    let model_exposed = outcome::fit_ridge(x, &y, &exposed_rows, config.ridge_lambda)?;
    let model_control = outcome::fit_ridge(x, &y, &control_rows, config.ridge_lambda)?;
    let mu1 = model_exposed.predict_all(x);
    let mu0 = model_control.predict_all(x);

    let scored = ScoredTable { w, y, ps, mu1, mu0 };

    let scores = scored.aipw_scores();
    let ate_aipw = mean(&scores);
    let aipw_interval =
        bootstrap::bootstrap_mean_interval(&scores, config.bootstrap_iterations, config.seed);
    let ate_t_learner = learners::t_learner_ate(&scored.mu1, &scored.mu0);
    let ate_x_learner = learners::x_learner_ate(
        x,
        &scored.w,
        &scored.y,
        &scored.mu1,
        &scored.mu0,
        &exposed_rows,
        &control_rows,
        config.ridge_lambda,
    )?;
    let bayes = bayes::fit_bayes(&scored.w, &scored.y, &config.bayes, config.seed);

    info!(
        "ATE estimates: AIPW {:.4} [{:.4}, {:.4}], T-learner {:.4}, X-learner {:.4}",
        ate_aipw, aipw_interval.lower, aipw_interval.upper, ate_t_learner, ate_x_learner
    );

    Ok(CausalEstimates {
        ate_aipw,
        aipw_interval,
        ate_t_learner,
        ate_x_learner,
        bayes,
    })
}

fn indices_where(values: &[f64], predicate: impl Fn(f64) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| predicate(v))
        .map(|(i, _)| i)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
