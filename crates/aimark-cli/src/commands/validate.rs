//! The `aimark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use aimark_core::validate::{validate_rubric, validate_sheet, ValidationWarning};

pub fn execute(sheet_path: PathBuf, rubric_path: Option<PathBuf>) -> Result<()> {
    let sheet = super::read_sheet(&sheet_path)?;
    println!(
        "Sheet: {} column(s), {} record(s)",
        sheet.headings().len(),
        sheet.record_count()
    );

    let mut total_warnings = 0;
    total_warnings += print_warnings(&validate_sheet(&sheet));

    if let Some(path) = &rubric_path {
        let rubric = super::read_rubric(path)?;
        println!(
            "Rubric: {} criteria, total weight {}",
            rubric.len(),
            rubric.total_weight()
        );
        total_warnings += print_warnings(&validate_rubric(&rubric));
    }

    if total_warnings == 0 {
        println!("No problems found.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) -> usize {
    for warning in warnings {
        let prefix = warning
            .row
            .map(|row| format!("  [row {row}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", warning.message);
    }
    warnings.len()
}
