//! Sync run reporting and error collection.
//!
//! The collector is a pure sink: it counts every per-record failure but
//! keeps detailed samples (and verbose logging) for only the first few,
//! so a board with thousands of bad rows cannot flood the log while the
//! summary still reflects every occurrence.

use crate::mapping::SyncMode;
use crate::storage::{SyncRun, TargetTable};
use serde::Serialize;

/// How many detailed `(item, message)` samples a run retains and logs.
pub const MAX_ERROR_SAMPLES: usize = 5;

/// One recoverable per-record failure.
#[derive(Debug, Clone, Serialize)]
pub struct RecordError {
    /// Human-readable identifier of the failing item (its name).
    pub item: String,
    /// Underlying error message.
    pub message: String,
}

/// Accumulates per-record failures for one board-sync run.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    total: usize,
    samples: Vec<RecordError>,
}

impl ErrorCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure. Never fails; logging is capped after the
    /// first [`MAX_ERROR_SAMPLES`] occurrences.
    pub fn record(&mut self, item: &str, message: &str) {
        self.total += 1;
        if self.samples.len() < MAX_ERROR_SAMPLES {
            tracing::warn!(item, message, "record failed, continuing");
            self.samples.push(RecordError {
                item: item.to_string(),
                message: message.to_string(),
            });
        } else {
            tracing::debug!(item, message, "record failed (sample cap reached)");
        }
    }

    /// Total number of failures recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Retained samples (at most [`MAX_ERROR_SAMPLES`]).
    #[must_use]
    pub fn samples(&self) -> &[RecordError] {
        &self.samples
    }

    /// Consume the collector into its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<RecordError> {
        self.samples
    }
}

/// Terminal state of a board-sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Run finished, possibly with a nonzero error count.
    Completed,
    /// Unrecoverable condition stopped the run for this board.
    Aborted,
}

impl RunOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one board-sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub board_id: String,
    pub table: TargetTable,
    pub mode: SyncMode,
    pub outcome: RunOutcome,
    /// Records newly inserted.
    pub imported: usize,
    /// Records updated in place (incremental upsert only).
    pub updated: usize,
    /// Records deliberately omitted (e.g. blank names).
    pub skipped: usize,
    /// Total per-record failures.
    pub errors: usize,
    /// Up to [`MAX_ERROR_SAMPLES`] failure details.
    pub error_samples: Vec<RecordError>,
    /// Fatal message, set only when `outcome` is `Aborted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
    pub started_at: i64,
    pub finished_at: i64,
}

impl SyncReport {
    /// Build the aborted form of a report for a board whose sync hit a
    /// fatal condition before (or while) processing.
    #[must_use]
    pub fn aborted(
        board_id: &str,
        table: TargetTable,
        mode: SyncMode,
        fatal: String,
        started_at: i64,
    ) -> Self {
        Self {
            board_id: board_id.to_string(),
            table,
            mode,
            outcome: RunOutcome::Aborted,
            imported: 0,
            updated: 0,
            skipped: 0,
            errors: 0,
            error_samples: Vec::new(),
            fatal: Some(fatal),
            started_at,
            finished_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Row form for the `sync_runs` log table.
    #[must_use]
    pub fn to_run(&self) -> SyncRun {
        SyncRun {
            board_id: self.board_id.clone(),
            table_name: self.table.as_str().to_string(),
            mode: self.mode.to_string(),
            outcome: self.outcome.as_str().to_string(),
            imported: self.imported,
            updated: self.updated,
            skipped: self.skipped,
            errors: self.errors,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Total records touched by the run.
    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.imported + self.updated + self.skipped + self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts_all_samples_few() {
        let mut collector = ErrorCollector::new();
        for i in 0..20 {
            collector.record(&format!("item {i}"), "boom");
        }
        assert_eq!(collector.total(), 20);
        assert_eq!(collector.samples().len(), MAX_ERROR_SAMPLES);
        assert_eq!(collector.samples()[0].item, "item 0");
    }

    #[test]
    fn test_aborted_report_shape() {
        let report = SyncReport::aborted(
            "tasks",
            TargetTable::Tasks,
            SyncMode::IncrementalUpsert,
            "board not found".to_string(),
            1000,
        );
        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.total_processed(), 0);
        assert!(report.fatal.as_deref().unwrap().contains("not found"));
    }
}
