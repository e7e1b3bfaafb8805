//! Grading report with JSON persistence.
//!
//! One report is written per grading pass: enough metadata to know what was
//! graded with which model, plus the per-entry outcomes and summary.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{EntryOutcome, GradingPass, GradingSummary};

/// A complete record of one grading pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Endpoint name the pass ran against.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Title of the graded column.
    pub column: String,
    /// Score ceiling applied to every entry.
    pub max_score: u32,
    /// Number of rubric criteria the model judged against.
    pub criteria_count: usize,
    /// Per-entry outcomes, in row order.
    pub outcomes: Vec<EntryOutcome>,
    /// Aggregate counts.
    pub summary: GradingSummary,
}

impl GradingReport {
    /// Assembles a report from a finished pass and its context.
    pub fn new(
        endpoint: &str,
        model: &str,
        column: &str,
        max_score: u32,
        criteria_count: usize,
        pass: GradingPass,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            column: column.to_string(),
            max_score,
            criteria_count,
            outcomes: pass.outcomes,
            summary: pass.summary,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EntryStatus;

    fn make_report() -> GradingReport {
        let pass = GradingPass {
            outcomes: vec![
                EntryOutcome {
                    row: 0,
                    status: EntryStatus::Graded { score: 2 },
                },
                EntryOutcome {
                    row: 1,
                    status: EntryStatus::Unparseable,
                },
                EntryOutcome {
                    row: 2,
                    status: EntryStatus::Failed {
                        message: "network error: connection refused".into(),
                    },
                },
            ],
            summary: GradingSummary {
                attempted: 3,
                graded: 1,
                unparseable: 1,
                failed: 1,
                cancelled: 0,
                duration_ms: 1200,
            },
        };
        GradingReport::new("custom", "llama3", "Q1", 3, 3, pass)
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("pass.json");

        report.save_json(&path).unwrap();
        let loaded = GradingReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.endpoint, "custom");
        assert_eq!(loaded.column, "Q1");
        assert_eq!(loaded.outcomes, report.outcomes);
        assert_eq!(loaded.summary, report.summary);
    }

    #[test]
    fn outcome_json_is_tagged_by_status() {
        let report = make_report();
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains(r#""status": "graded""#));
        assert!(json.contains(r#""status": "unparseable""#));
        assert!(json.contains(r#""status": "failed""#));
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = GradingReport::load_json(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read report"));
    }
}
