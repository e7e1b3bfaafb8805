//! Offline grade example — grade a sheet without any server.
//!
//! Anything implementing [`ChatModel`] plugs into the grader; here the
//! bundled mock stands in for a real endpoint, and criterion weights show
//! how one criterion can be worth several marks.
//!
//! ```bash
//! cargo run --example offline_grade
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use aimark_core::engine::{Grader, GradingConfig, NoopReporter};
use aimark_core::rubric::Rubric;
use aimark_core::table::Table;
use aimark_core::traits::ChatModel;
use aimark_lm::MockModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Scripted replies keyed on substrings of the prompt
    let mut replies = HashMap::new();
    replies.insert("binary search".to_string(), "[1, 2]".to_string());
    replies.insert("look at every item".to_string(), "[]".to_string());
    let model: Arc<dyn ChatModel> = Arc::new(MockModel::new(replies));

    let mut sheet = Table::from_text(
        "Name\tAnswer\tscore\n\
         Ada\tA binary search halves the range each step.\t?\n\
         Ben\tYou look at every item until you find it.\t?",
    );

    // The first criterion is worth two marks
    let mut rubric = Rubric::from_text(
        "Describes halving the search range\n\
         Names the approach as binary search",
    );
    rubric.set_weight(1, 2);

    let column = sheet.resolve_column("Answer").expect("Answer column exists");
    let grader = Grader::new(model, GradingConfig::default());
    grader
        .grade_column(
            &mut sheet,
            column,
            &rubric,
            &NoopReporter,
            &CancellationToken::new(),
        )
        .await?;

    for record in sheet.records() {
        let name = &record[0].value;
        match record[column].score {
            Some(score) => println!("{name}: {score}/{}", rubric.total_weight()),
            None => println!("{name}: unscored"),
        }
    }

    Ok(())
}
