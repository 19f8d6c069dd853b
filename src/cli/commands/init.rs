//! Initialize the boardsync database.
//!
//! Creates the SQLite file at the resolved path (flag, config, or the
//! global `~/.boardsync/boardsync.db`) and applies the current schema.
//! Sync commands refuse to run against a missing database, so this is
//! the required first step on a new machine.

use crate::config::{discover_config_file, global_dir, Config};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,
    boards: usize,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the database already exists (without `--force`)
/// or cannot be created.
pub fn execute(
    force: bool,
    config_path: Option<&PathBuf>,
    db_flag: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path.map(PathBuf::as_path))?;
    let db_path = config.resolve_db_path(db_flag.map(PathBuf::as_path))?;

    if db_path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized {
                path: db_path.clone(),
            });
        }
        fs::remove_file(&db_path)?;
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Opening applies the schema and pragmas.
    let storage = SqliteStorage::open(&db_path)?;
    drop(storage);

    let config_file = write_skeleton_config(&config, config_path.is_some())?;

    if json {
        let output = InitOutput {
            database: db_path,
            config: config_file,
            boards: config.boards.len(),
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Initialized boardsync database");
        println!("  Database: {}", db_path.display());
        if let Some(path) = &config_file {
            println!("  Config:   {}", path.display());
        }
        println!("  Boards configured: {}", config.boards.len());
        println!();
        println!("Next: set {} and run 'boardsync sync --all'.", crate::config::TOKEN_ENV);
    }

    Ok(())
}

/// Write a skeleton config to the global directory when none exists yet,
/// so `init` leaves an editable file behind. Never overwrites a found
/// config and skips entirely when `--config` pointed at an explicit file.
fn write_skeleton_config(config: &Config, explicit: bool) -> Result<Option<PathBuf>> {
    if explicit || discover_config_file().is_some() {
        return Ok(None);
    }
    let Some(dir) = global_dir() else {
        return Ok(None);
    };

    fs::create_dir_all(&dir)?;
    let path = dir.join("config.json");
    let mut skeleton = config.clone();
    skeleton.api_token = String::new();
    fs::write(&path, serde_json::to_string_pretty(&skeleton)?)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Tests pass an explicit config so init never touches the real
    // global directory.
    fn setup(dir: &TempDir) -> (PathBuf, PathBuf) {
        let config = dir.path().join("boardsync.json");
        fs::write(&config, "{}").unwrap();
        (config, dir.path().join("boardsync.db"))
    }

    #[test]
    fn test_init_creates_database() {
        let dir = TempDir::new().unwrap();
        let (config, db) = setup(&dir);
        execute(false, Some(&config), Some(&db), true).unwrap();
        assert!(db.exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let dir = TempDir::new().unwrap();
        let (config, db) = setup(&dir);
        execute(false, Some(&config), Some(&db), true).unwrap();

        let result = execute(false, Some(&config), Some(&db), true);
        assert!(matches!(result, Err(Error::AlreadyInitialized { .. })));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let (config, db) = setup(&dir);
        execute(false, Some(&config), Some(&db), true).unwrap();
        execute(true, Some(&config), Some(&db), true).unwrap();
        assert!(db.exists());
    }
}
