//! Non-blocking validation of grading inputs.
//!
//! Warnings point out sheets and rubrics that will grade strangely; nothing
//! here ever prevents a pass from running.

use crate::rubric::Rubric;
use crate::table::Table;

/// A warning from sheet or rubric validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The record row (if applicable).
    pub row: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a parsed sheet for common issues.
pub fn validate_sheet(table: &Table) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if table.headings().is_empty() {
        warnings.push(ValidationWarning {
            row: None,
            message: "no columns parsed from the header line".into(),
        });
        return warnings;
    }

    // Duplicate titles make column selection by title ambiguous
    let mut seen_titles = std::collections::HashSet::new();
    for heading in table.headings() {
        if !seen_titles.insert(&heading.title) {
            warnings.push(ValidationWarning {
                row: None,
                message: format!("duplicate column title: {}", heading.title),
            });
        }
    }

    // Empty responses still cost a model request each
    for (row, record) in table.records().iter().enumerate() {
        for (entry, heading) in record.iter().zip(table.headings()) {
            if entry.value.trim().is_empty() && entry.score.is_none() {
                warnings.push(ValidationWarning {
                    row: Some(row),
                    message: format!("empty response in column {}", heading.title),
                });
            }
        }
    }

    if table.is_empty() {
        warnings.push(ValidationWarning {
            row: None,
            message: "sheet has a header but no records".into(),
        });
    }

    warnings
}

/// Validate a rubric for common issues.
pub fn validate_rubric(rubric: &Rubric) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if rubric.is_empty() {
        warnings.push(ValidationWarning {
            row: None,
            message: "rubric has no criteria; grading will refuse to run".into(),
        });
        return warnings;
    }

    let mut seen = std::collections::HashSet::new();
    for criterion in rubric.criteria() {
        if !seen.insert(&criterion.text) {
            warnings.push(ValidationWarning {
                row: None,
                message: format!("duplicate criterion: {}", criterion.text),
            });
        }
    }

    warnings
}
