//! T-learner and X-learner meta-strategies.

use ndarray::Array2;

use crate::error::AnalysisError;
use crate::pipeline::causal::outcome::fit_ridge;

/// T-learner ATE: mean difference of the two arm models' predictions over
/// all rows.
pub fn t_learner_ate(mu1: &[f64], mu0: &[f64]) -> f64 {
    let n = mu1.len();
    if n == 0 {
        return 0.0;
    }
    mu1.iter()
        .zip(mu0.iter())
        .map(|(m1, m0)| m1 - m0)
        .sum::<f64>()
        / n as f64
}

/// X-learner ATE.
///
/// Per-unit pseudo-effects (Y - mu0 on treated rows, mu1 - Y on control
/// rows) are regressed within each arm; every row is then predicted with
/// the opposite arm's model and the predictions averaged.
#[allow(clippy::too_many_arguments)]
pub fn x_learner_ate(
    x: &Array2<f64>,
    w: &[f64],
    y: &[f64],
    mu1: &[f64],
    mu0: &[f64],
    exposed_rows: &[usize],
    control_rows: &[usize],
    lambda: f64,
) -> Result<f64, AnalysisError> {
    let pseudo_treated: Vec<f64> = y.iter().zip(mu0.iter()).map(|(yi, m0)| yi - m0).collect();
    let pseudo_control: Vec<f64> = mu1.iter().zip(y.iter()).map(|(m1, yi)| m1 - yi).collect();

    let model_treated = fit_ridge(x, &pseudo_treated, exposed_rows, lambda)?;
    let model_control = fit_ridge(x, &pseudo_control, control_rows, lambda)?;

    let n = w.len();
    let total: f64 = (0..n)
        .map(|row| {
            if w[row] > 0.5 {
                // Treated rows are scored by the control-arm effect model.
                model_control.predict_row(x, row)
            } else {
                model_treated.predict_row(x, row)
            }
        })
        .sum();

    Ok(total / n as f64)
}
