//! Quick grade example — minimal programmatic usage of aimark.
//!
//! This example grades a small pasted sheet against a rubric using the
//! default endpoint from aimark.toml.
//!
//! ```bash
//! # Point the "custom" endpoint at a local server first (aimark init),
//! # then run:
//! cargo run --example quick_grade
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use aimark_core::engine::{Grader, GradingConfig, NoopReporter};
use aimark_core::rubric::Rubric;
use aimark_core::table::Table;
use aimark_core::traits::ChatModel;
use aimark_lm::{create_lm, load_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load endpoint config from aimark.toml
    let config = load_config()?;
    let endpoint_config = config
        .endpoints
        .get(&config.default_endpoint)
        .expect("default endpoint not configured");
    let model: Arc<dyn ChatModel> =
        Arc::new(create_lm(&config.default_endpoint, endpoint_config));

    // A sheet pasted straight out of a spreadsheet
    let mut sheet = Table::from_text(
        "Name\tAnswer\tscore\n\
         Ada\tData is split into packets that each carry an address.\t?\n\
         Ben\tThe whole file travels down the wire in one piece.\t?",
    );

    let rubric = Rubric::from_text(
        "Mentions that data is split into packets\n\
         Explains that each packet carries a destination address",
    );

    println!(
        "Grading {} answers against {} criteria...\n",
        sheet.record_count(),
        rubric.len()
    );

    let column = sheet.resolve_column("Answer").expect("Answer column exists");
    let grader = Grader::new(model, GradingConfig::default());
    let pass = grader
        .grade_column(
            &mut sheet,
            column,
            &rubric,
            &NoopReporter,
            &CancellationToken::new(),
        )
        .await?;

    println!(
        "Graded {} of {} entries in {}ms\n",
        pass.summary.graded, pass.summary.attempted, pass.summary.duration_ms
    );

    // The graded sheet pastes straight back into the spreadsheet
    println!("{sheet}");

    Ok(())
}
