//! Error types for the brand lift analysis pipeline.
//!
//! Fatal preconditions (missing schema columns, empty KPI configuration,
//! empty post-cleaning data) abort the run with a variant from this enum.
//! Recoverable gaps never appear here: a question with no rows or a failed
//! Bayesian fit is reported inside the results object instead.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required schema column is absent from the survey table.
    #[error("Required column '{column}' not found in survey data")]
    MissingColumn {
        /// Canonical name of the missing column
        column: String,
    },

    /// No treatment-group column was found under any accepted alias.
    #[error("No panel group column found (accepted names: {aliases})")]
    NoPanelGroupColumn {
        /// Comma-separated list of accepted column names
        aliases: String,
    },

    /// The KPI configuration contains no KPI mappings.
    #[error("No KPI mappings found in KPI configuration")]
    EmptyKpiMap,

    /// A KPI maps to an empty question list.
    #[error("KPI '{kpi}' has no associated question ids")]
    KpiWithoutQuestions {
        /// Name of the offending KPI
        kpi: String,
    },

    /// A respondent appears in more than one panel group. Treatment
    /// assignment is respondent-level, so this data cannot be analyzed.
    #[error("Respondent '{respondent}' appears in multiple panel groups: {groups}")]
    InconsistentAssignment {
        /// Respondent identifier
        respondent: String,
        /// The distinct panel group values observed for this respondent
        groups: String,
    },

    /// Cleaning removed every row of the survey table.
    #[error("No data remaining after cleaning")]
    EmptyAfterCleaning,

    /// One treatment arm has no rows, so per-arm outcome models cannot
    /// be fit and no causal contrast exists.
    #[error("Panel group '{group}' has no rows; cannot fit per-arm outcome models")]
    EmptyArm {
        /// Label of the empty arm
        group: String,
    },

    /// A model fit failed in a way that is not recoverable.
    #[error("Model fitting failed: {0}")]
    Model(String),

    /// An underlying dataframe operation failed.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}
