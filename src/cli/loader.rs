//! Survey and KPI configuration loaders.
//!
//! File I/O lives here, outside the analysis pipeline: the pipeline itself
//! only ever sees an in-memory frame and a parsed KPI map.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::pipeline::KpiMap;

/// Load the long-format survey table from a CSV file.
pub fn load_survey(path: &Path) -> Result<DataFrame> {
    let lf = LazyCsvReader::new(path)
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?;
    let df = lf
        .collect()
        .with_context(|| format!("Failed to read survey data: {}", path.display()))?;
    Ok(df)
}

/// Load the KPI configuration JSON.
///
/// Expected shape: `{"kpi_mappings": {"<kpi name>": ["Q1", "Q2"], ...}}`.
/// KPI order in the file is preserved.
pub fn load_kpi_config(path: &Path) -> Result<KpiMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read KPI config: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("KPI config is not valid JSON: {}", path.display()))?;

    let mappings = value
        .get("kpi_mappings")
        .and_then(|v| v.as_object())
        .context("KPI config must contain a 'kpi_mappings' object")?;

    let mut entries = Vec::new();
    for (kpi, questions) in mappings {
        let list = questions
            .as_array()
            .with_context(|| format!("KPI '{}' must map to a list of question ids", kpi))?;
        let question_ids: Vec<String> = list
            .iter()
            .map(|q| {
                q.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("KPI '{}' has a non-string question id", kpi))
            })
            .collect::<Result<_>>()?;
        entries.push((kpi.clone(), question_ids));
    }

    Ok(KpiMap::from_entries(entries)?)
}
