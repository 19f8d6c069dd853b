//! Sync command implementation.
//!
//! Resolves configuration, builds the API client, and drives the sync
//! engine inside a dedicated tokio runtime. A single-board run
//! propagates fatal conditions as errors (and exit codes); an `--all`
//! run tolerates per-board aborts and reports them in the summary.

use crate::api::BoardApiClient;
use crate::cli::SyncArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::mapping::{BoardDescriptor, SyncMode};
use crate::storage::SqliteStorage;
use crate::sync::{RunOutcome, SyncEngine, SyncReport};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error when configuration is incomplete, the database is
/// missing, the named board has no descriptor, or (single-board runs
/// only) the sync itself hits a fatal condition.
pub fn execute(
    args: &SyncArgs,
    config_path: Option<&PathBuf>,
    db_flag: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path.map(PathBuf::as_path))?;
    let token = config.require_token()?.to_string();

    let db_path = config.resolve_db_path(db_flag.map(PathBuf::as_path))?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let mut descriptors = select_descriptors(&config, args)?;
    if args.full_refresh {
        for desc in &mut descriptors {
            desc.mode = SyncMode::FullRefresh;
        }
    }

    let page_size = args.page_size.unwrap_or(config.page_size);
    let cooldown = args
        .cooldown
        .map_or_else(|| config.cooldown(), Duration::from_secs);

    let mut storage = SqliteStorage::open(&db_path)?;
    let client = BoardApiClient::new(&config.endpoint, &token);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    let reports = if args.all {
        rt.block_on(async {
            let mut engine = SyncEngine::new(&client, &mut storage);
            Ok::<_, Error>(engine.sync_all(&descriptors, page_size, cooldown).await)
        })?
    } else {
        // Single-board runs surface fatal conditions as errors.
        let report = rt.block_on(async {
            let mut engine = SyncEngine::new(&client, &mut storage);
            engine.sync_board(&descriptors[0], page_size).await
        })?;
        vec![report]
    };

    if json {
        println!("{}", serde_json::to_string(&reports)?);
        return Ok(());
    }

    for report in &reports {
        print_report(report);
    }
    print_totals(&reports);

    Ok(())
}

/// Resolve which descriptors this invocation targets.
fn select_descriptors(config: &Config, args: &SyncArgs) -> Result<Vec<BoardDescriptor>> {
    if args.all {
        if config.boards.is_empty() {
            return Err(Error::Config("no boards configured".to_string()));
        }
        return Ok(config.boards.clone());
    }

    let key = args.board.as_deref().ok_or_else(|| {
        Error::InvalidArgument("specify a board id/table name, or --all".to_string())
    })?;

    config
        .descriptor(key)
        .cloned()
        .map(|d| vec![d])
        .ok_or_else(|| Error::DescriptorNotFound {
            id: key.to_string(),
        })
}

fn print_report(report: &SyncReport) {
    let header = format!("{} -> {}", report.board_id, report.table);
    match report.outcome {
        RunOutcome::Completed => {
            println!("{} {} ({})", "synced".green().bold(), header, report.mode);
            println!(
                "  {} imported, {} updated, {} skipped, {} errors",
                report.imported, report.updated, report.skipped, report.errors
            );
            for sample in &report.error_samples {
                println!("  {} {}: {}", "!".yellow(), sample.item, sample.message);
            }
        }
        RunOutcome::Aborted => {
            println!("{} {}", "aborted".red().bold(), header);
            if let Some(fatal) = &report.fatal {
                println!("  {fatal}");
            }
        }
    }
}

fn print_totals(reports: &[SyncReport]) {
    if reports.len() < 2 {
        return;
    }
    let aborted = reports
        .iter()
        .filter(|r| r.outcome == RunOutcome::Aborted)
        .count();
    let imported: usize = reports.iter().map(|r| r.imported).sum();
    let updated: usize = reports.iter().map(|r| r.updated).sum();
    let errors: usize = reports.iter().map(|r| r.errors).sum();

    println!();
    println!(
        "{} boards, {} imported, {} updated, {} record errors, {} aborted",
        reports.len(),
        imported,
        updated,
        errors,
        aborted
    );
}
