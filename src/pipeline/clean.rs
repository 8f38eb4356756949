//! Data cleaning stage.
//!
//! Two operations, applied in order: drop columns with excessive missing
//! values, then derive the binary purchase-intent outcome from the designated
//! question. The input frame is left untouched; cleaning produces a new
//! [`CleanedTable`] that later stages treat as immutable.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::schema::{
    column_as_strings, EXPOSED_LABEL, PANEL_COL, QUESTION_COL, RESPONDENT_COL, RESPONSE_COL,
};

/// Derived binary outcome column.
pub const OUTCOME_COL: &str = "purchase_binary";

/// Survey table after cleaning. The frame carries the canonical schema
/// columns, any surviving covariate columns, and the derived outcome.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    df: DataFrame,
    dropped_columns: Vec<String>,
}

impl CleanedTable {
    /// The cleaned frame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Columns removed by the missingness filter.
    pub fn dropped_columns(&self) -> &[String] {
        &self.dropped_columns
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Per-row treatment indicator: 1.0 for Exposed rows, 0.0 otherwise.
    pub fn treatment(&self) -> Result<Vec<f64>, AnalysisError> {
        let panels = column_as_strings(self.df.column(PANEL_COL)?)?;
        Ok(panels
            .iter()
            .map(|p| match p {
                Some(label) if label == EXPOSED_LABEL => 1.0,
                _ => 0.0,
            })
            .collect())
    }

    /// Per-row binary outcome as f64.
    pub fn outcomes(&self) -> Result<Vec<f64>, AnalysisError> {
        let col = self.df.column(OUTCOME_COL)?.cast(&DataType::Float64)?;
        Ok(col.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }

    /// Per-row respondent identifiers.
    pub fn respondents(&self) -> Result<Vec<Option<String>>, AnalysisError> {
        column_as_strings(self.df.column(RESPONDENT_COL)?)
    }

    /// Per-row panel group labels.
    pub fn panel_groups(&self) -> Result<Vec<Option<String>>, AnalysisError> {
        column_as_strings(self.df.column(PANEL_COL)?)
    }

    /// Per-row question ids.
    pub fn questions(&self) -> Result<Vec<Option<String>>, AnalysisError> {
        column_as_strings(self.df.column(QUESTION_COL)?)
    }

    /// Per-row response labels.
    pub fn responses(&self) -> Result<Vec<Option<String>>, AnalysisError> {
        column_as_strings(self.df.column(RESPONSE_COL)?)
    }
}

/// Run the cleaning stage over a validated survey table.
pub fn clean(df: &DataFrame, config: &AnalysisConfig) -> Result<CleanedTable, AnalysisError> {
    let (mut df, dropped_columns) = drop_high_missing(df, config)?;
    derive_outcome(&mut df, config)?;

    if df.height() == 0 {
        return Err(AnalysisError::EmptyAfterCleaning);
    }

    Ok(CleanedTable {
        df,
        dropped_columns,
    })
}

/// Drop columns whose null fraction exceeds the configured threshold,
/// keeping protected columns and the canonical schema columns.
fn drop_high_missing(
    df: &DataFrame,
    config: &AnalysisConfig,
) -> Result<(DataFrame, Vec<String>), AnalysisError> {
    let height = df.height();
    if height == 0 {
        return Ok((df.clone(), Vec::new()));
    }

    let mut to_drop = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if is_protected(name, config) {
            continue;
        }
        let missing_ratio = column.null_count() as f64 / height as f64;
        if missing_ratio > config.missing_threshold {
            to_drop.push(name.to_string());
        }
    }

    if to_drop.is_empty() {
        info!("No columns exceed missing threshold");
        return Ok((df.clone(), to_drop));
    }

    info!("Dropping columns with high missingness: {:?}", to_drop);
    let mut out = df.clone();
    for name in &to_drop {
        out = out.drop(name)?;
    }
    Ok((out, to_drop))
}

fn is_protected(name: &str, config: &AnalysisConfig) -> bool {
    [RESPONDENT_COL, QUESTION_COL, RESPONSE_COL, PANEL_COL].contains(&name)
        || config.protected_columns.iter().any(|c| c == name)
}

/// Derive the binary outcome column from the designated question.
///
/// A respondent is marked 1 when their response to the outcome question
/// equals the positive label (case-insensitive); every other respondent,
/// including those who never answered the question, is 0. The flag is
/// attached to every row of the respondent.
fn derive_outcome(df: &mut DataFrame, config: &AnalysisConfig) -> Result<(), AnalysisError> {
    let questions = column_as_strings(df.column(QUESTION_COL)?)?;
    let responses = column_as_strings(df.column(RESPONSE_COL)?)?;
    let respondents = column_as_strings(df.column(RESPONDENT_COL)?)?;

    let positive = config.positive_response.to_lowercase();

    // First answer wins if a respondent somehow answered the question twice.
    let mut flags: HashMap<&str, i32> = HashMap::new();
    for ((question, response), respondent) in questions
        .iter()
        .zip(responses.iter())
        .zip(respondents.iter())
    {
        let (Some(question), Some(respondent)) = (question, respondent) else {
            continue;
        };
        if question != &config.outcome_question {
            continue;
        }
        let flag = match response {
            Some(r) if r.to_lowercase() == positive => 1,
            _ => 0,
        };
        flags.entry(respondent.as_str()).or_insert(flag);
    }

    let outcome: Vec<i32> = respondents
        .iter()
        .map(|r| match r {
            Some(id) => flags.get(id.as_str()).copied().unwrap_or(0),
            None => 0,
        })
        .collect();

    df.with_column(Column::new(OUTCOME_COL.into(), outcome))?;
    Ok(())
}
