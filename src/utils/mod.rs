//! Terminal helpers shared by the CLI.

pub mod progress;

pub use progress::{create_spinner, finish_with_success};

use console::style;

/// Print the styled application banner.
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("📊 BRANDLIFT").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a numbered step header.
pub fn print_step_header(step: usize, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(format!("[{}]", step)).cyan().bold(),
        style(title).white().bold()
    );
}
