//! Ridge outcome regression.
//!
//! Per-arm conditional-mean models fit by solving the ridge normal
//! equations with a Cholesky factorization. The intercept column is
//! unpenalized, which keeps the system positive definite for any lambda > 0
//! even on degenerate designs such as the constant placeholder covariate.

use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::Array2;

use crate::error::AnalysisError;

/// Fitted ridge regression model. The weight vector carries one entry per
/// covariate plus a trailing intercept.
#[derive(Debug, Clone)]
pub struct RidgeModel {
    weights: DVector<f64>,
}

/// Fit a ridge model on the selected rows of the design matrix.
pub fn fit_ridge(
    x: &Array2<f64>,
    y: &[f64],
    rows: &[usize],
    lambda: f64,
) -> Result<RidgeModel, AnalysisError> {
    if rows.is_empty() {
        return Err(AnalysisError::Model(
            "ridge regression requires at least one row".to_string(),
        ));
    }

    let k = x.ncols();
    let d = k + 1;
    let design = DMatrix::from_fn(rows.len(), d, |i, j| {
        if j < k {
            x[[rows[i], j]]
        } else {
            1.0
        }
    });
    let targets = DVector::from_iterator(rows.len(), rows.iter().map(|&r| y[r]));

    let mut normal = design.transpose() * &design;
    for j in 0..k {
        normal[(j, j)] += lambda;
    }
    let rhs = design.transpose() * targets;

    let cholesky = Cholesky::new(normal).ok_or_else(|| {
        AnalysisError::Model("ridge normal equations are not positive definite".to_string())
    })?;
    let weights = cholesky.solve(&rhs);

    Ok(RidgeModel { weights })
}

impl RidgeModel {
    /// Predict the expected outcome for one row of the design matrix.
    pub fn predict_row(&self, x: &Array2<f64>, row: usize) -> f64 {
        let k = x.ncols();
        let mut value = self.weights[k];
        for j in 0..k {
            value += self.weights[j] * x[[row, j]];
        }
        value
    }

    /// Predict for every row of the design matrix.
    pub fn predict_all(&self, x: &Array2<f64>) -> Vec<f64> {
        (0..x.nrows()).map(|row| self.predict_row(x, row)).collect()
    }
}
