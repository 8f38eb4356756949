//! Propensity score model.
//!
//! Regularized logistic regression of the treatment indicator on the
//! covariate matrix. Predicted probabilities are clamped away from exactly
//! 0 and 1 so the inverse-propensity terms downstream can never divide by
//! zero.

use linfa::dataset::Dataset;
use linfa::traits::Fit;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};

use crate::error::AnalysisError;

/// Bound keeping propensity scores inside the open interval (0, 1).
pub const PS_EPSILON: f64 = 1e-6;

/// Fit the propensity model and return one score per row.
pub fn fit_propensity(
    x: &Array2<f64>,
    w: &[f64],
    penalty: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let labels: Array1<i64> = w.iter().map(|&v| if v > 0.5 { 1i64 } else { 0 }).collect();
    let dataset = Dataset::new(x.clone(), labels);

    let model = LogisticRegression::default()
        .with_intercept(true)
        .alpha(penalty)
        .max_iterations(500)
        .fit(&dataset)
        .map_err(|e| AnalysisError::Model(format!("propensity model: {}", e)))?;

    let probabilities = model.predict_probabilities(x);
    Ok(probabilities
        .iter()
        .map(|p| p.clamp(PS_EPSILON, 1.0 - PS_EPSILON))
        .collect())
}
