//! Results object and terminal rendering.

pub mod summary;

pub use summary::{aggregate, data_quality, significance_label, DataQuality, KpiSummary};

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::causal::CausalEstimates;
use crate::pipeline::schema::CoverageReport;
use crate::pipeline::significance::{QuestionTest, TestVariant};

/// Complete output of one analysis run. Serializable contract for
/// downstream reporting; nothing in it is mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    /// Per-(KPI, question) presence report
    pub coverage: CoverageReport,
    /// One significance record per tested question
    pub question_tests: Vec<QuestionTest>,
    /// Causal estimate bundle
    pub causal: CausalEstimates,
    /// One aggregated summary per KPI
    pub kpi_summaries: Vec<KpiSummary>,
    /// Respondent counts and completion statistics
    pub data_quality: DataQuality,
}

impl AnalysisResults {
    /// Pretty-printed JSON for export.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render the results to the terminal.
    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📈").cyan(),
            style("CAUSAL EFFECT ESTIMATES").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut estimates = Table::new();
        estimates.load_preset(UTF8_FULL_CONDENSED);
        estimates.set_header(vec![
            Cell::new("Estimator").add_attribute(Attribute::Bold),
            Cell::new("ATE (%)").add_attribute(Attribute::Bold),
            Cell::new("95% interval").add_attribute(Attribute::Bold),
        ]);
        estimates.add_row(vec![
            Cell::new("AIPW (headline)").add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}", self.causal.ate_aipw * 100.0)).fg(Color::Green),
            Cell::new(format!(
                "[{:.2}, {:.2}]",
                self.causal.aipw_interval.lower * 100.0,
                self.causal.aipw_interval.upper * 100.0
            )),
        ]);
        estimates.add_row(vec![
            Cell::new("T-learner"),
            Cell::new(format!("{:.2}", self.causal.ate_t_learner * 100.0)),
            Cell::new("-"),
        ]);
        estimates.add_row(vec![
            Cell::new("X-learner"),
            Cell::new(format!("{:.2}", self.causal.ate_x_learner * 100.0)),
            Cell::new("-"),
        ]);
        match &self.causal.bayes {
            Some(bayes) => {
                estimates.add_row(vec![
                    Cell::new("Bayesian (log-odds)"),
                    Cell::new(format!("{:.3}", bayes.mean)),
                    Cell::new(format!("[{:.3}, {:.3}]", bayes.lower, bayes.upper)),
                ]);
            }
            None => {
                estimates.add_row(vec![
                    Cell::new("Bayesian (log-odds)"),
                    Cell::new("unavailable").fg(Color::Yellow),
                    Cell::new("-"),
                ]);
            }
        }
        indent_table(&estimates);

        println!();
        println!(
            "    {} {}",
            style("🧪").cyan(),
            style("QUESTION TESTS").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut tests = Table::new();
        tests.load_preset(UTF8_FULL_CONDENSED);
        tests.set_header(vec![
            Cell::new("Question").add_attribute(Attribute::Bold),
            Cell::new("Test").add_attribute(Attribute::Bold),
            Cell::new("p").add_attribute(Attribute::Bold),
            Cell::new("adj p").add_attribute(Attribute::Bold),
        ]);
        for test in &self.question_tests {
            let p = test
                .p_value
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "-".to_string());
            let adj = test
                .p_corrected
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "-".to_string());
            let variant_cell = match test.variant {
                TestVariant::NoData => Cell::new(test.variant.to_string()).fg(Color::Yellow),
                _ => Cell::new(test.variant.to_string()),
            };
            tests.add_row(vec![Cell::new(&test.question), variant_cell, Cell::new(p), Cell::new(adj)]);
        }
        indent_table(&tests);

        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("KPI SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut kpis = Table::new();
        kpis.load_preset(UTF8_FULL_CONDENSED);
        kpis.set_header(vec![
            Cell::new("KPI").add_attribute(Attribute::Bold),
            Cell::new("Questions").add_attribute(Attribute::Bold),
            Cell::new("Significance").add_attribute(Attribute::Bold),
            Cell::new("ATE (%)").add_attribute(Attribute::Bold),
            Cell::new("95% CI").add_attribute(Attribute::Bold),
        ]);
        for summary in &self.kpi_summaries {
            kpis.add_row(vec![
                Cell::new(&summary.kpi).add_attribute(Attribute::Bold),
                Cell::new(summary.questions.join(", ")),
                Cell::new(summary.significance.join("; ")),
                Cell::new(format!("{:.2}", summary.ate_aipw_pct)),
                Cell::new(format!(
                    "[{:.2}, {:.2}]",
                    summary.ci_lower_pct, summary.ci_upper_pct
                )),
            ]);
        }
        indent_table(&kpis);

        println!();
        println!(
            "      {} respondents ({} Control / {} Exposed), completion {:.1}%",
            self.data_quality.total_respondents,
            self.data_quality.control_respondents,
            self.data_quality.exposed_respondents,
            self.data_quality.completion_rate_pct
        );
        if !self.data_quality.dropped_columns.is_empty() {
            println!(
                "      Dropped columns: {}",
                self.data_quality.dropped_columns.join(", ")
            );
        }
        let missing = self.coverage.missing_questions();
        if !missing.is_empty() {
            println!(
                "      {} {}",
                style("Questions not found in data:").yellow(),
                missing.join(", ")
            );
        }
    }
}

fn indent_table(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
