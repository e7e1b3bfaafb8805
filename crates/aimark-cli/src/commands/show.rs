//! The `aimark show` command.

use std::path::PathBuf;

use anyhow::Result;

use aimark_core::table::{SCORE_TOKEN, UNSET_SCORE};

/// Longest value rendered before abbreviation kicks in.
const MAX_VALUE_CHARS: usize = 50;

pub fn execute(sheet_path: PathBuf) -> Result<()> {
    let sheet = super::read_sheet(&sheet_path)?;

    if sheet.headings().is_empty() {
        println!("(empty sheet)");
        return Ok(());
    }

    let mut table = comfy_table::Table::new();
    let mut header: Vec<String> = Vec::new();
    for heading in sheet.headings() {
        header.push(heading.title.clone());
        if heading.has_score {
            header.push(SCORE_TOKEN.to_string());
        }
    }
    table.set_header(header);

    for record in sheet.records() {
        let mut cells: Vec<String> = Vec::new();
        for (heading, entry) in sheet.headings().iter().zip(record) {
            cells.push(abbreviate(&entry.value));
            if heading.has_score {
                cells.push(
                    entry
                        .score
                        .map(|score| score.to_string())
                        .unwrap_or_else(|| UNSET_SCORE.to_string()),
                );
            }
        }
        table.add_row(cells);
    }

    println!("{table}");
    println!("\n{} record(s)", sheet.record_count());

    Ok(())
}

/// Cap a value at [`MAX_VALUE_CHARS`] characters, `...`-terminated.
fn abbreviate(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
        format!("{head}...")
    }
}
