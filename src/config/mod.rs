//! Configuration management.
//!
//! Run parameters (API endpoint and credential, database path, page
//! size, inter-board cooldown, board descriptors) are supplied
//! externally: a JSON config file plus environment overrides. Nothing in
//! the sync core hard-codes a credential or connection string.
//!
//! Resolution strategy for the config file:
//! 1. An explicit `--config` path, used as-is
//! 2. `boardsync.json`, walking up from the current directory
//! 3. The global `~/.boardsync/config.json`
//!
//! The API token may always be overridden via `BOARDSYNC_API_TOKEN`,
//! which keeps credentials out of checked-in config files.

use crate::error::{Error, Result};
use crate::mapping::{builtin_descriptors, BoardDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configured API token.
pub const TOKEN_ENV: &str = "BOARDSYNC_API_TOKEN";

/// Config file name searched for in the directory walk-up.
pub const CONFIG_FILE: &str = "boardsync.json";

fn default_endpoint() -> String {
    "https://api.monday.com/v2".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_cooldown_secs() -> u64 {
    5
}

fn default_boards() -> Vec<BoardDescriptor> {
    builtin_descriptors()
}

/// Full run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Board API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API credential. Usually left empty in the file and supplied via
    /// the `BOARDSYNC_API_TOKEN` environment variable.
    #[serde(default)]
    pub api_token: String,

    /// Database path; `None` resolves to the global location.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Items per page when fetching a board.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Cooldown between board-level fetches in `sync --all`.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Board mapping descriptors.
    #[serde(default = "default_boards")]
    pub boards: Vec<BoardDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: String::new(),
            db_path: None,
            page_size: default_page_size(),
            cooldown_secs: default_cooldown_secs(),
            boards: default_boards(),
        }
    }
}

impl Config {
    /// Load configuration, applying the environment token override.
    ///
    /// With no config file anywhere, returns the defaults (built-in
    /// descriptors, empty token).
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path does not exist or a found
    /// file fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => discover_config_file(),
        };

        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)?;
                serde_json::from_str(&raw)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
            }
            None => Self::default(),
        };

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.api_token = token;
            }
        }

        Ok(config)
    }

    /// Resolve the database path: explicit flag, then config, then the
    /// global `~/.boardsync/boardsync.db`.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn resolve_db_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = explicit {
            return Ok(p.to_path_buf());
        }
        if let Some(p) = &self.db_path {
            return Ok(p.clone());
        }
        global_dir()
            .map(|dir| dir.join("boardsync.db"))
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
    }

    /// Fail unless an API token is configured.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the env var when the token is empty.
    pub fn require_token(&self) -> Result<&str> {
        if self.api_token.is_empty() {
            return Err(Error::Config(format!(
                "no API token configured (set {TOKEN_ENV} or api_token in the config file)"
            )));
        }
        Ok(&self.api_token)
    }

    /// Find a descriptor by board id or target table name.
    #[must_use]
    pub fn descriptor(&self, key: &str) -> Option<&BoardDescriptor> {
        self.boards
            .iter()
            .find(|d| d.board_id == key || d.table.as_str() == key)
    }

    /// Inter-board cooldown as a `Duration`.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Global boardsync directory (`~/.boardsync`).
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".boardsync"))
}

/// Walk up from the current directory looking for `boardsync.json`,
/// falling back to the global config file.
#[must_use]
pub fn discover_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    global_dir()
        .map(|dir| dir.join("config.json"))
        .filter(|p| p.is_file())
}
