//! Shared test utilities and fixture generators

use brandlift::pipeline::KpiMap;
use polars::prelude::*;

/// Build a long-format survey frame from (respondent, panel, question,
/// response) rows.
pub fn survey_frame(rows: &[(String, String, String, String)]) -> DataFrame {
    df! {
        "Respondent_ID" => rows.iter().map(|r| r.0.as_str()).collect::<Vec<_>>(),
        "panel_group" => rows.iter().map(|r| r.1.as_str()).collect::<Vec<_>>(),
        "Question_ID" => rows.iter().map(|r| r.2.as_str()).collect::<Vec<_>>(),
        "Response_Code" => rows.iter().map(|r| r.3.as_str()).collect::<Vec<_>>(),
    }
    .unwrap()
}

/// Scenario fixture: `n_per_arm` respondents per panel, one "Q2" row each.
/// `exposed_positive` / `control_positive` of them answer "Very Likely";
/// the rest answer "Not Likely".
pub fn lift_scenario_frame(
    n_per_arm: usize,
    exposed_positive: usize,
    control_positive: usize,
) -> DataFrame {
    let mut rows = Vec::with_capacity(2 * n_per_arm);
    for i in 0..n_per_arm {
        let response = if i < exposed_positive {
            "Very Likely"
        } else {
            "Not Likely"
        };
        rows.push((
            format!("E{}", i),
            "Exposed".to_string(),
            "Q2".to_string(),
            response.to_string(),
        ));
    }
    for i in 0..n_per_arm {
        let response = if i < control_positive {
            "Very Likely"
        } else {
            "Not Likely"
        };
        rows.push((
            format!("C{}", i),
            "Control".to_string(),
            "Q2".to_string(),
            response.to_string(),
        ));
    }
    survey_frame(&rows)
}

/// KPI map with a single purchase-intent KPI over Q2.
pub fn purchase_intent_kpis() -> KpiMap {
    KpiMap::from_entries(vec![(
        "Purchase Intent".to_string(),
        vec!["Q2".to_string()],
    )])
    .unwrap()
}

/// KPI map referencing a question with no data alongside Q2.
pub fn kpis_with_missing_question() -> KpiMap {
    KpiMap::from_entries(vec![
        ("Purchase Intent".to_string(), vec!["Q2".to_string()]),
        ("Message Recall".to_string(), vec!["Q9".to_string()]),
    ])
    .unwrap()
}
