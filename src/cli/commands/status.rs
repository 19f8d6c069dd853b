//! Status command implementation.
//!
//! Read-only view: per-table record counts plus the tail of the
//! `sync_runs` log, most recent first.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{SqliteStorage, SyncRun, TargetTable};
use chrono::{TimeZone, Utc};
use colored::Colorize;
use std::path::PathBuf;

const ALL_TABLES: [TargetTable; 5] = [
    TargetTable::Clients,
    TargetTable::Tasks,
    TargetTable::Payments,
    TargetTable::Deals,
    TargetTable::Projects,
];

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the database is missing or a query fails.
pub fn execute(
    limit: usize,
    config_path: Option<&PathBuf>,
    db_flag: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path.map(PathBuf::as_path))?;
    let db_path = config.resolve_db_path(db_flag.map(PathBuf::as_path))?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let storage = SqliteStorage::open(&db_path)?;

    let mut counts = Vec::with_capacity(ALL_TABLES.len());
    for table in ALL_TABLES {
        counts.push((table, storage.count(table)?));
    }
    let runs = storage.recent_runs(limit)?;

    if json {
        let output = serde_json::json!({
            "database": db_path.display().to_string(),
            "tables": counts
                .iter()
                .map(|(t, n)| (t.as_str().to_string(), *n))
                .collect::<std::collections::BTreeMap<_, _>>(),
            "recent_runs": runs,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Database: {}", db_path.display());
    println!();
    println!("Tables:");
    for (table, count) in &counts {
        println!("  {:<10} {count}", table.as_str());
    }

    println!();
    if runs.is_empty() {
        println!("No sync runs recorded yet.");
    } else {
        println!("Recent runs:");
        for run in &runs {
            print_run(run);
        }
    }

    Ok(())
}

fn print_run(run: &SyncRun) {
    let outcome = if run.outcome == "completed" {
        run.outcome.green()
    } else {
        run.outcome.red()
    };
    println!(
        "  {} {} {} -> {}: {} imported, {} updated, {} skipped, {} errors",
        format_millis(run.finished_at),
        outcome,
        run.board_id,
        run.table_name,
        run.imported,
        run.updated,
        run.skipped,
        run.errors
    );
}

/// Render a Unix-millis timestamp as UTC for display.
fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis_renders_utc() {
        // 2024-03-15T00:00:00Z
        assert_eq!(format_millis(1_710_460_800_000), "2024-03-15 00:00:00");
    }

    #[test]
    fn test_missing_database_is_not_initialized() {
        let db = PathBuf::from("/nonexistent/boardsync.db");
        let result = execute(5, None, Some(&db), true);
        assert!(matches!(result, Err(Error::NotInitialized)));
    }
}
