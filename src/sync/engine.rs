//! Sync orchestrator.
//!
//! Drives one full board synchronization: fetch via the board source, map
//! every item and its subitems, persist through the store, collect
//! per-record errors, and emit a summary. Processing is strictly
//! sequential: one board at a time, items in source order, each write
//! awaited before the next.
//!
//! Failure handling follows the run taxonomy: fetch failures, a missing
//! board, and a failed full-refresh clear abort the board (and only that
//! board); a single item's failure is counted and never blocks its
//! siblings or the board summary.

use crate::api::{BoardSource, Item};
use crate::mapping::{map_item, BoardDescriptor, SyncMode};
use crate::storage::{SqliteStorage, UpsertOutcome};
use crate::sync::report::{ErrorCollector, RunOutcome, SyncReport};
use crate::error::Result;
use std::time::Duration;

/// Orchestrates board-sync runs against one store connection.
///
/// The store handle is borrowed for the run and released when the engine
/// goes out of scope; there is exactly one writer at a time.
pub struct SyncEngine<'a, S: BoardSource> {
    source: &'a S,
    storage: &'a mut SqliteStorage,
}

/// Mutable counters threaded through the per-item loop.
#[derive(Default)]
struct Tally {
    imported: usize,
    updated: usize,
    skipped: usize,
}

impl<'a, S: BoardSource> SyncEngine<'a, S> {
    pub fn new(source: &'a S, storage: &'a mut SqliteStorage) -> Self {
        Self { source, storage }
    }

    /// Synchronize one board.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions: fetch/API failure,
    /// board not found, or a failed full-refresh clear. Per-record
    /// failures are counted in the report instead.
    pub async fn sync_board(
        &mut self,
        desc: &BoardDescriptor,
        page_size: u32,
    ) -> Result<SyncReport> {
        let started_at = chrono::Utc::now().timestamp_millis();
        tracing::info!(
            board_id = desc.board_id,
            table = %desc.table,
            mode = %desc.mode,
            "starting board sync"
        );

        // Fetching
        let board = self
            .source
            .fetch_board(&desc.board_id, page_size)
            .await?;

        // Full-refresh clear is a precondition: if it fails the board
        // aborts rather than risking stale-plus-new duplication.
        if desc.mode == SyncMode::FullRefresh {
            let cleared = self.storage.clear_table(desc.table)?;
            tracing::debug!(table = %desc.table, cleared, "cleared target table");
        }

        // Mapping & Persisting
        let mut tally = Tally::default();
        let mut errors = ErrorCollector::new();

        for item in &board.items {
            self.process_item(desc, item, None, &mut tally, &mut errors);
            for subitem in &item.subitems {
                self.process_item(desc, subitem, Some(&item.name), &mut tally, &mut errors);
            }
        }

        // Summarizing
        let report = SyncReport {
            board_id: desc.board_id.clone(),
            table: desc.table,
            mode: desc.mode,
            outcome: RunOutcome::Completed,
            imported: tally.imported,
            updated: tally.updated,
            skipped: tally.skipped,
            errors: errors.total(),
            error_samples: errors.into_samples(),
            fatal: None,
            started_at,
            finished_at: chrono::Utc::now().timestamp_millis(),
        };

        if let Err(e) = self.storage.record_run(&report.to_run()) {
            tracing::warn!(error = %e, "failed to record run in sync log");
        }

        tracing::info!(
            board_id = desc.board_id,
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors,
            "board sync finished"
        );

        Ok(report)
    }

    /// Synchronize a set of boards sequentially.
    ///
    /// A fixed cooldown separates board-level fetches (a deliberate
    /// throttle against the rate-limited remote, not an optimization).
    /// One board's abort never stops the remaining boards; aborted
    /// boards yield an `Aborted` report.
    pub async fn sync_all(
        &mut self,
        descriptors: &[BoardDescriptor],
        page_size: u32,
        cooldown: Duration,
    ) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(descriptors.len());

        for (i, desc) in descriptors.iter().enumerate() {
            if i > 0 && !cooldown.is_zero() {
                tracing::debug!(cooldown_ms = cooldown.as_millis() as u64, "inter-board cooldown");
                tokio::time::sleep(cooldown).await;
            }

            let started_at = chrono::Utc::now().timestamp_millis();
            match self.sync_board(desc, page_size).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!(board_id = desc.board_id, error = %e, "board sync aborted");
                    let report = SyncReport::aborted(
                        &desc.board_id,
                        desc.table,
                        desc.mode,
                        e.to_string(),
                        started_at,
                    );
                    if let Err(log_err) = self.storage.record_run(&report.to_run()) {
                        tracing::warn!(error = %log_err, "failed to record aborted run");
                    }
                    reports.push(report);
                }
            }
        }

        reports
    }

    /// Map and persist one item or subitem, isolating failures.
    fn process_item(
        &mut self,
        desc: &BoardDescriptor,
        item: &Item,
        parent_name: Option<&str>,
        tally: &mut Tally,
        errors: &mut ErrorCollector,
    ) {
        let Some(record) = map_item(desc, item, parent_name) else {
            tracing::debug!(item_id = item.id, "skipping item with blank name");
            tally.skipped += 1;
            return;
        };

        let result = match desc.mode {
            SyncMode::FullRefresh => self
                .storage
                .insert_record(desc.table, &record)
                .map(|_| UpsertOutcome::Inserted),
            SyncMode::IncrementalUpsert => self.storage.upsert_record(desc.table, &record),
        };

        match result {
            Ok(UpsertOutcome::Inserted) => tally.imported += 1,
            Ok(UpsertOutcome::Updated) => tally.updated += 1,
            Err(e) => errors.record(&record.name, &e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Board, BoardSource, ColumnValue};
    use crate::error::Error;
    use crate::mapping::{FieldKind, FieldMap};
    use crate::model::FieldValue;
    use crate::storage::TargetTable;
    use std::collections::HashMap;

    struct FakeSource {
        boards: HashMap<String, Board>,
    }

    impl FakeSource {
        fn single(board: Board) -> Self {
            let mut boards = HashMap::new();
            boards.insert(board.id.clone(), board);
            Self { boards }
        }
    }

    impl BoardSource for FakeSource {
        async fn fetch_board(&self, board_id: &str, _page_size: u32) -> Result<Board> {
            self.boards
                .get(board_id)
                .cloned()
                .ok_or_else(|| Error::BoardNotFound {
                    id: board_id.to_string(),
                })
        }
    }

    fn item(id: &str, name: &str, values: Vec<(&str, ColumnValue)>) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            subitems: Vec::new(),
        }
    }

    fn number(text: &str) -> ColumnValue {
        ColumnValue::Number {
            text: Some(text.to_string()),
        }
    }

    fn tasks_descriptor(mode: SyncMode) -> BoardDescriptor {
        BoardDescriptor {
            board_id: "tasks".to_string(),
            table: TargetTable::Tasks,
            mode,
            parent_field: Some("parent_name".to_string()),
            fields: vec![FieldMap {
                column_id: "col".to_string(),
                field: "hours".to_string(),
                kind: FieldKind::Number,
            }],
        }
    }

    fn board(items: Vec<Item>) -> Board {
        Board {
            id: "tasks".to_string(),
            name: "Tasks".to_string(),
            columns: Vec::new(),
            items,
        }
    }

    #[tokio::test]
    async fn test_numeric_scenario_null_and_continue() {
        // Items: A with "5", blank name with "10", B with unparsable "x".
        // Expected: 2 imported, 1 skipped, 0 errors; B's hours is NULL.
        let source = FakeSource::single(board(vec![
            item("1", "A", vec![("col", number("5"))]),
            item("2", "", vec![("col", number("10"))]),
            item("3", "B", vec![("col", number("x"))]),
        ]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        let report = engine
            .sync_board(&tasks_descriptor(SyncMode::IncrementalUpsert), 50)
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.outcome, RunOutcome::Completed);

        let a_hours: Option<f64> = storage
            .conn()
            .query_row("SELECT hours FROM tasks WHERE name = 'A'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(a_hours, Some(5.0));

        let b_hours: Option<f64> = storage
            .conn()
            .query_row("SELECT hours FROM tasks WHERE name = 'B'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(b_hours, None);
    }

    #[tokio::test]
    async fn test_incremental_upsert_is_idempotent() {
        let source = FakeSource::single(board(vec![
            item("1", "A", vec![("col", number("5"))]),
            item("2", "B", vec![("col", number("7"))]),
        ]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let desc = tasks_descriptor(SyncMode::IncrementalUpsert);

        let mut engine = SyncEngine::new(&source, &mut storage);
        let first = engine.sync_board(&desc, 50).await.unwrap();
        let second = engine.sync_board(&desc, 50).await.unwrap();

        assert_eq!(first.imported, 2);
        assert_eq!(second.imported, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(storage.count(TargetTable::Tasks).unwrap(), 2);

        let hours: f64 = storage
            .conn()
            .query_row("SELECT hours FROM tasks WHERE external_id = '1'", [], |r| r.get(0))
            .unwrap();
        assert!((hours - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_full_refresh_is_deterministic() {
        let source = FakeSource::single(board(vec![
            item("1", "A", vec![("col", number("5"))]),
            item("2", "B", vec![]),
        ]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let desc = tasks_descriptor(SyncMode::FullRefresh);

        let mut engine = SyncEngine::new(&source, &mut storage);
        let first = engine.sync_board(&desc, 50).await.unwrap();
        let second = engine.sync_board(&desc, 50).await.unwrap();

        assert_eq!(first.imported, second.imported);
        assert_eq!(storage.count(TargetTable::Tasks).unwrap(), 2);

        let names: Vec<String> = storage
            .conn()
            .prepare("SELECT name FROM tasks ORDER BY name")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_error_isolation_run_completes() {
        // Duplicate external id under full refresh: the second insert
        // violates the UNIQUE constraint and is counted, not fatal.
        let source = FakeSource::single(board(vec![
            item("1", "A", vec![]),
            item("1", "A again", vec![]),
            item("2", "B", vec![]),
        ]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        let report = engine
            .sync_board(&tasks_descriptor(SyncMode::FullRefresh), 50)
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.error_samples[0].item, "A again");
    }

    #[tokio::test]
    async fn test_subitem_flattened_with_parent_reference() {
        let mut parent = item("10", "Acme Corp", vec![]);
        parent.subitems.push(item("11", "Invoice #2", vec![]));
        let source = FakeSource::single(board(vec![parent]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        let report = engine
            .sync_board(&tasks_descriptor(SyncMode::IncrementalUpsert), 50)
            .await
            .unwrap();
        assert_eq!(report.imported, 2);

        let parent_ref: Option<String> = storage
            .conn()
            .query_row(
                "SELECT parent_name FROM tasks WHERE name = 'Invoice #2'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(parent_ref.as_deref(), Some("Acme Corp"));

        // The parent row itself carries no parent reference.
        let own_ref: Option<String> = storage
            .conn()
            .query_row(
                "SELECT parent_name FROM tasks WHERE name = 'Acme Corp'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(own_ref, None);
    }

    #[tokio::test]
    async fn test_missing_board_aborts_only_that_board() {
        let source = FakeSource::single(board(vec![item("1", "A", vec![])]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        let mut missing = tasks_descriptor(SyncMode::IncrementalUpsert);
        missing.board_id = "nope".to_string();
        let ok = tasks_descriptor(SyncMode::IncrementalUpsert);

        let reports = engine
            .sync_all(&[missing, ok], 50, Duration::ZERO)
            .await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].outcome, RunOutcome::Aborted);
        assert!(reports[0].fatal.as_deref().unwrap().contains("nope"));
        assert_eq!(reports[1].outcome, RunOutcome::Completed);
        assert_eq!(reports[1].imported, 1);
    }

    struct SlowFailingSource;

    impl BoardSource for SlowFailingSource {
        async fn fetch_board(&self, board_id: &str, _page_size: u32) -> Result<Board> {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Err(Error::BoardNotFound {
                id: board_id.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_aborted_report_spans_the_failed_fetch() {
        // started_at must be captured before the fetch, not after it
        // fails, so the run-log row reflects the board's actual window.
        let source = SlowFailingSource;
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        let reports = engine
            .sync_all(
                &[tasks_descriptor(SyncMode::IncrementalUpsert)],
                50,
                Duration::ZERO,
            )
            .await;

        assert_eq!(reports[0].outcome, RunOutcome::Aborted);
        assert!(reports[0].finished_at - reports[0].started_at >= 20);
    }

    #[tokio::test]
    async fn test_runs_are_logged() {
        let source = FakeSource::single(board(vec![item("1", "A", vec![])]));
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut engine = SyncEngine::new(&source, &mut storage);

        engine
            .sync_board(&tasks_descriptor(SyncMode::IncrementalUpsert), 50)
            .await
            .unwrap();

        let runs = storage.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].board_id, "tasks");
        assert_eq!(runs[0].imported, 1);
        assert_eq!(runs[0].outcome, "completed");
    }

    #[tokio::test]
    async fn test_second_upsert_preserves_sparse_fields() {
        // First run populates hours; in the second run the column went
        // blank at the source, which must not null out the stored value.
        let first_source = FakeSource::single(board(vec![item(
            "1",
            "A",
            vec![("col", number("8"))],
        )]));
        let second_source = FakeSource::single(board(vec![item("1", "A", vec![])]));
        let desc = tasks_descriptor(SyncMode::IncrementalUpsert);
        let mut storage = SqliteStorage::open_memory().unwrap();

        SyncEngine::new(&first_source, &mut storage)
            .sync_board(&desc, 50)
            .await
            .unwrap();
        SyncEngine::new(&second_source, &mut storage)
            .sync_board(&desc, 50)
            .await
            .unwrap();

        let hours: Option<f64> = storage
            .conn()
            .query_row("SELECT hours FROM tasks WHERE external_id = '1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hours, Some(8.0));
    }
}
