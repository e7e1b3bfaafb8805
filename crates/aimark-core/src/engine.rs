//! Grading pass orchestrator.
//!
//! Walks the ungraded entries of one sheet column, asks the model to judge
//! each response against the rubric, and writes the clamped scores back by
//! row identity. Entries the model cannot judge stay unset.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::prompt::grading_prompt;
use crate::rubric::Rubric;
use crate::table::Table;
use crate::traits::ChatModel;

/// Markers delimiting the JSON payload expected from the model.
const ARRAY_START: &str = "[";
const ARRAY_END: &str = "]";

/// Configuration for a grading pass.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Upper bound applied to every written score. `None` means full marks,
    /// i.e. the rubric's total weight.
    pub max_score: Option<u32>,
    /// Maximum concurrent model requests. 1 grades strictly in row order.
    pub parallelism: usize,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            max_score: None,
            parallelism: 1,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_entry_start(&self, row: usize);
    fn on_entry_graded(&self, row: usize, score: i64);
    fn on_entry_unscored(&self, row: usize, reason: &str);
    fn on_pass_complete(&self, summary: &GradingSummary);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_entry_start(&self, _: usize) {}
    fn on_entry_graded(&self, _: usize, _: i64) {}
    fn on_entry_unscored(&self, _: usize, _: &str) {}
    fn on_pass_complete(&self, _: &GradingSummary) {}
}

/// What happened to one entry during a grading pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    /// A score was written back.
    Graded { score: i64 },
    /// The model answered but no criteria array could be parsed.
    Unparseable,
    /// The request failed; the entry stays unset.
    Failed { message: String },
    /// The pass was cancelled before this entry was judged.
    Cancelled,
}

/// Per-entry record of a grading pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutcome {
    /// Record row index in the sheet.
    pub row: usize,
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Aggregate counts for a grading pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingSummary {
    /// Ungraded entries the pass picked up.
    pub attempted: usize,
    /// Entries that received a score (0 included).
    pub graded: usize,
    /// Entries whose reply carried no criteria array.
    pub unparseable: usize,
    /// Entries whose request failed.
    pub failed: usize,
    /// Entries skipped because the pass was cancelled.
    pub cancelled: usize,
    /// Wall-clock duration of the pass.
    pub duration_ms: u64,
}

/// Result of one grading pass: per-entry outcomes plus the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingPass {
    pub outcomes: Vec<EntryOutcome>,
    pub summary: GradingSummary,
}

/// The grading pass orchestrator.
pub struct Grader {
    model: Arc<dyn ChatModel>,
    config: GradingConfig,
}

impl Grader {
    pub fn new(model: Arc<dyn ChatModel>, config: GradingConfig) -> Self {
        Self { model, config }
    }

    /// Grades every ungraded entry of one column.
    ///
    /// Entries that already carry a score are left alone. Each ungraded
    /// entry is judged at most once: the model's criteria array is scored
    /// through the rubric, clamped to the max score, and written back by row
    /// identity, so completion order under parallelism never misattributes
    /// a score. Per-entry failures leave the entry unset and the pass keeps
    /// going; only an empty rubric or a bad column aborts it.
    pub async fn grade_column(
        &self,
        table: &mut Table,
        column: usize,
        rubric: &Rubric,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<GradingPass> {
        anyhow::ensure!(!rubric.is_empty(), "rubric has no criteria, nothing to grade");
        anyhow::ensure!(
            column < table.headings().len(),
            "column index {column} out of range for a sheet with {} columns",
            table.headings().len()
        );

        let start = Instant::now();
        let max_score = self.config.max_score.unwrap_or_else(|| rubric.total_weight());
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        // Snapshot the work up front: one prompt per ungraded entry, in row
        // order. The futures own their prompts, so the table stays free for
        // the write-back below.
        let pending: Vec<(usize, String)> = table
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| record[column].score.is_none())
            .map(|(row, record)| (row, grading_prompt(rubric, &record[column].value)))
            .collect();

        let mut futures = FuturesUnordered::new();
        for (row, prompt) in pending {
            let model = Arc::clone(&self.model);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            futures.push(async move {
                // The semaphore is never closed; treat closure as cancellation.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (row, EntryStatus::Cancelled);
                };
                if cancel.is_cancelled() {
                    return (row, EntryStatus::Cancelled);
                }
                progress.on_entry_start(row);

                let asked = tokio::select! {
                    _ = cancel.cancelled() => return (row, EntryStatus::Cancelled),
                    asked = model.ask_json(&prompt, ARRAY_START, ARRAY_END) => asked,
                };

                let status = match asked {
                    Ok(Some(payload)) => match criterion_ids(&payload) {
                        Some(ids) => EntryStatus::Graded {
                            score: i64::from(rubric.assess(&ids).min(max_score)),
                        },
                        None => EntryStatus::Unparseable,
                    },
                    Ok(None) => EntryStatus::Unparseable,
                    Err(e) => EntryStatus::Failed {
                        message: e.to_string(),
                    },
                };
                (row, status)
            });
        }

        let mut outcomes = Vec::new();
        let mut summary = GradingSummary::default();

        while let Some((row, status)) = futures.next().await {
            summary.attempted += 1;
            match &status {
                EntryStatus::Graded { score } => {
                    table.set_score(row, column, *score);
                    progress.on_entry_graded(row, *score);
                    summary.graded += 1;
                }
                EntryStatus::Unparseable => {
                    tracing::warn!(row, "reply carried no criteria array, leaving unset");
                    progress.on_entry_unscored(row, "reply carried no criteria array");
                    summary.unparseable += 1;
                }
                EntryStatus::Failed { message } => {
                    tracing::warn!(row, error = %message, "request failed, leaving unset");
                    progress.on_entry_unscored(row, message);
                    summary.failed += 1;
                }
                EntryStatus::Cancelled => {
                    summary.cancelled += 1;
                }
            }
            outcomes.push(EntryOutcome { row, status });
        }

        // Completion order varies under parallelism.
        outcomes.sort_by_key(|outcome| outcome.row);

        summary.duration_ms = start.elapsed().as_millis() as u64;
        progress.on_pass_complete(&summary);

        Ok(GradingPass { outcomes, summary })
    }
}

/// Reads a criteria-id list out of the model's JSON payload.
///
/// Anything but an array is `None`. Array elements may be JSON integers or
/// strings that trim-parse as integers (models stringify ids often enough
/// that rejecting them would throw away good grades); everything else in
/// the array is ignored.
fn criterion_ids(payload: &Value) -> Option<Vec<i64>> {
    let items = payload.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| {
                item.as_i64()
                    .or_else(|| item.as_str().and_then(|s| s.trim().parse().ok()))
            })
            .collect(),
    )
}
