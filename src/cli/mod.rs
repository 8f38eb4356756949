//! Command-line driver around the analysis pipeline.

pub mod args;
pub mod loader;

pub use args::Cli;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use crate::pipeline::run_analysis;
use crate::utils::{create_spinner, finish_with_success, print_banner, print_step_header};

/// Parse arguments, run the pipeline, render and optionally export the
/// results.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    print_banner(env!("CARGO_PKG_VERSION"));
    let started = Instant::now();

    print_step_header(1, "LOAD DATA");
    let df = loader::load_survey(&cli.input)?;
    let kpis = loader::load_kpi_config(&cli.kpi_config)?;
    println!(
        "      {} rows, {} columns, {} KPIs",
        df.height(),
        df.width(),
        kpis.len()
    );

    print_step_header(2, "ANALYZE");
    let config = cli.to_config();
    let spinner = create_spinner("Running analysis pipeline");
    let results = run_analysis(df, &kpis, &config)?;
    finish_with_success(&spinner, "Analysis complete");

    results.display();

    if let Some(path) = &cli.output {
        let json = results.to_json().context("Failed to serialize results")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        println!();
        println!("      Results written to {}", path.display());
    }

    println!();
    println!("      Done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}
