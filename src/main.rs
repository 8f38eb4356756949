//! Brandlift CLI entry point.

use anyhow::Result;

fn main() -> Result<()> {
    brandlift::cli::run()
}
