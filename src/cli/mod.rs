//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// boardsync - pull work-management boards into a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "boardsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: boardsync.json, searched upward)
    #[arg(long, global = true, env = "BOARDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (default: ~/.boardsync/boardsync.db)
    #[arg(long, global = true, env = "BOARDSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the local database and apply the schema
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Synchronize one board (or all configured boards)
    Sync(SyncArgs),

    /// List configured board descriptors
    Boards,

    /// Show table counts and recent sync runs
    Status {
        /// Maximum runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Board id or target table name to sync
    pub board: Option<String>,

    /// Sync every configured board
    #[arg(long, conflicts_with = "board")]
    pub all: bool,

    /// Force full-refresh mode regardless of descriptor settings
    #[arg(long)]
    pub full_refresh: bool,

    /// Items per page (overrides config)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Seconds to wait between boards with --all (overrides config)
    #[arg(long)]
    pub cooldown: Option<u64>,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
