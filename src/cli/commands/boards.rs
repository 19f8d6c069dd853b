//! Boards command implementation.
//!
//! Lists the configured board descriptors so an operator can see which
//! boards a `sync --all` would touch, and in which mode.

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;

/// Execute the boards command.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded.
pub fn execute(config_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let config = Config::load(config_path.map(PathBuf::as_path))?;

    if json {
        println!("{}", serde_json::to_string(&config.boards)?);
        return Ok(());
    }

    if config.boards.is_empty() {
        println!("No boards configured.");
        return Ok(());
    }

    println!(
        "{:<14} {:<10} {:<20} {}",
        "BOARD", "TABLE", "MODE", "FIELDS"
    );
    for desc in &config.boards {
        println!(
            "{:<14} {:<10} {:<20} {}",
            desc.board_id,
            desc.table.as_str(),
            desc.mode.to_string(),
            desc.fields.len()
        );
    }

    Ok(())
}
