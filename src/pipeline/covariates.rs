//! Covariate design matrix construction.
//!
//! Everything in the cleaned table that is not an identifier, the treatment
//! column, or the derived outcome becomes a covariate. Numeric columns are
//! cast to f64; categorical columns are one-hot expanded with the first
//! level dropped. When nothing usable remains, a single constant column
//! stands in so downstream models always see a non-empty design matrix.

use ndarray::Array2;
use polars::prelude::*;
use tracing::debug;

use crate::error::AnalysisError;
use crate::pipeline::clean::{CleanedTable, OUTCOME_COL};
use crate::pipeline::schema::{
    column_as_strings, PANEL_COL, QUESTION_COL, RESPONDENT_COL, RESPONSE_COL,
};

/// Name of the placeholder column used when no covariates exist.
const PLACEHOLDER_COL: &str = "constant";

/// Numeric design matrix over all rows of the cleaned table.
#[derive(Debug, Clone)]
pub struct CovariateMatrix {
    matrix: Array2<f64>,
    names: Vec<String>,
}

impl CovariateMatrix {
    /// The design matrix, one row per table row.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Column names, one-hot columns as `<column>=<level>`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of design columns.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Whether the matrix is the constant placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.names.len() == 1 && self.names[0] == PLACEHOLDER_COL
    }
}

/// Build the covariate matrix from a cleaned table.
pub fn build_covariates(table: &CleanedTable) -> Result<CovariateMatrix, AnalysisError> {
    let df = table.frame();
    let n_rows = df.height();

    let excluded = [
        RESPONDENT_COL,
        QUESTION_COL,
        RESPONSE_COL,
        PANEL_COL,
        OUTCOME_COL,
    ];

    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if excluded.contains(&name) {
            continue;
        }
        if column.dtype().is_primitive_numeric() || column.dtype() == &DataType::Boolean {
            columns.push((name.to_string(), numeric_values(column)?));
        } else {
            columns.extend(one_hot_values(column)?);
        }
    }

    if columns.is_empty() {
        debug!("No usable covariates; substituting constant placeholder column");
        columns.push((PLACEHOLDER_COL.to_string(), vec![0.0; n_rows]));
    }

    let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
    let mut matrix = Array2::zeros((n_rows, columns.len()));
    for (j, (_, values)) in columns.iter().enumerate() {
        for (i, &value) in values.iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }

    Ok(CovariateMatrix { matrix, names })
}

/// Cast a numeric column to f64, nulls becoming 0.0.
fn numeric_values(column: &Column) -> Result<Vec<f64>, AnalysisError> {
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// One-hot expand a categorical column, dropping the first (lexicographic)
/// level. A column with a single level expands to nothing.
fn one_hot_values(column: &Column) -> Result<Vec<(String, Vec<f64>)>, AnalysisError> {
    let values = column_as_strings(column)?;

    let mut levels: Vec<String> = values.iter().flatten().cloned().collect();
    levels.sort();
    levels.dedup();

    let name = column.name().as_str();
    let mut out = Vec::new();
    for level in levels.iter().skip(1) {
        let indicator: Vec<f64> = values
            .iter()
            .map(|v| match v {
                Some(s) if s == level => 1.0,
                _ => 0.0,
            })
            .collect();
        out.push((format!("{}={}", name, level), indicator));
    }
    Ok(out)
}
