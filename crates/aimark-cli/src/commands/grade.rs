//! The `aimark grade` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use aimark_core::engine::{Grader, GradingConfig, GradingSummary, ProgressReporter};
use aimark_core::report::GradingReport;
use aimark_core::traits::ChatModel;
use aimark_lm::{create_lm, load_config_from};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_entry_start(&self, row: usize) {
        eprintln!("  Grading: row {row}");
    }

    fn on_entry_graded(&self, row: usize, score: i64) {
        eprintln!("  Done: row {row} scored {score}");
    }

    fn on_entry_unscored(&self, row: usize, reason: &str) {
        eprintln!("  Unscored: row {row}: {reason}");
    }

    fn on_pass_complete(&self, summary: &GradingSummary) {
        eprintln!(
            "\nComplete: {}/{} graded, {} unscored ({:.1}s)",
            summary.graded,
            summary.attempted,
            summary.unparseable + summary.failed + summary.cancelled,
            summary.duration_ms as f64 / 1000.0
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    sheet_path: PathBuf,
    rubric_path: PathBuf,
    column_selector: String,
    max_score: Option<u32>,
    endpoint: Option<String>,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Load config
    let config = load_config_from(config_path.as_deref())?;

    // Parse inputs; an empty rubric is refused before any endpoint is built
    let mut table = super::read_sheet(&sheet_path)?;
    let rubric = super::read_rubric(&rubric_path)?;
    anyhow::ensure!(
        !rubric.is_empty(),
        "rubric '{}' has no criteria",
        rubric_path.display()
    );

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    // Resolve the column by title, then by index
    let column = table.resolve_column(&column_selector).ok_or_else(|| {
        anyhow::anyhow!(
            "column '{}' not found in sheet. Available: {:?}",
            column_selector,
            table
                .headings()
                .iter()
                .map(|h| h.title.as_str())
                .collect::<Vec<_>>()
        )
    })?;
    let title = table.headings()[column].title.clone();

    // Build the endpoint
    let endpoint_name = endpoint.unwrap_or_else(|| config.default_endpoint.clone());
    let Some(endpoint_config) = config.endpoints.get(&endpoint_name) else {
        anyhow::bail!(
            "endpoint '{}' not found in config. Available: {:?}",
            endpoint_name,
            config.endpoints.keys().collect::<Vec<_>>()
        );
    };
    let model_id = endpoint_config.model.clone();
    tracing::info!(endpoint = %endpoint_name, model = %model_id, "grading endpoint selected");
    let model: Arc<dyn ChatModel> = Arc::new(create_lm(&endpoint_name, endpoint_config));

    let grading_config = GradingConfig {
        max_score: max_score.or(config.default_max_score),
        parallelism,
    };
    let effective_max = grading_config
        .max_score
        .unwrap_or_else(|| rubric.total_weight());

    // Ctrl-C cancels the pass; scores already written are kept
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling, scores already written are kept...");
            signal_cancel.cancel();
        }
    });

    let ungraded = table
        .records()
        .iter()
        .filter(|record| record[column].score.is_none())
        .count();
    eprintln!(
        "aimark v0.1.0 — grading {} of {} entries in column '{}' ({} criteria, max score {})",
        ungraded,
        table.record_count(),
        title,
        rubric.len(),
        effective_max
    );
    eprintln!();

    let grader = Grader::new(model, grading_config);
    let pass = grader
        .grade_column(&mut table, column, &rubric, &ConsoleReporter, &cancel)
        .await?;

    print_summary(&pass.summary);

    // Write the graded sheet
    let serialized = table.to_string();
    match &output {
        Some(path) => {
            std::fs::write(path, format!("{serialized}\n"))
                .with_context(|| format!("failed to write sheet to {}", path.display()))?;
            eprintln!("Graded sheet written to: {}", path.display());
        }
        None => println!("{serialized}"),
    }

    // Save the report
    if let Some(path) = &report {
        let grading_report = GradingReport::new(
            &endpoint_name,
            &model_id,
            &title,
            effective_max,
            rubric.len(),
            pass,
        );
        grading_report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &GradingSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Attempted",
        "Graded",
        "No criteria array",
        "Failed",
        "Cancelled",
        "Duration",
    ]);
    table.add_row(vec![
        Cell::new(summary.attempted),
        Cell::new(summary.graded),
        Cell::new(summary.unparseable),
        Cell::new(summary.failed),
        Cell::new(summary.cancelled),
        Cell::new(format!("{:.1}s", summary.duration_ms as f64 / 1000.0)),
    ]);

    eprintln!("\n{table}");
}
