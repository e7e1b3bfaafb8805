//! Subcommand implementations.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use aimark_core::rubric::Rubric;
use aimark_core::table::Table;

pub mod endpoints;
pub mod grade;
pub mod init;
pub mod show;
pub mod validate;

/// Read and parse a sheet from a file, or from stdin when the path is `-`.
fn read_sheet(path: &Path) -> Result<Table> {
    let text = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read sheet from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sheet: {}", path.display()))?
    };
    Ok(Table::from_text(&text))
}

/// Read and parse a rubric file.
fn read_rubric(path: &Path) -> Result<Rubric> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rubric: {}", path.display()))?;
    Ok(Rubric::from_text(&text))
}
