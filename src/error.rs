//! Error types for boardsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Only fatal conditions become an `Error` (spec taxonomy): per-record
//! failures are caught at the item boundary by the sync engine and
//! funneled to its error collector instead of propagating here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for boardsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    BoardNotFound,
    DescriptorNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // API (exit 5)
    ApiError,
    RateLimited,

    // Config (exit 6)
    ConfigError,

    // I/O (exit 7)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::BoardNotFound => "BOARD_NOT_FOUND",
            Self::DescriptorNotFound => "DESCRIPTOR_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ApiError => "API_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-7).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::BoardNotFound | Self::DescriptorNotFound => 3,
            Self::InvalidArgument => 4,
            Self::ApiError | Self::RateLimited => 5,
            Self::ConfigError => 6,
            Self::IoError | Self::JsonError => 7,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in boardsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `boardsync init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Board not found: {id}")]
    BoardNotFound { id: String },

    #[error("No descriptor configured for board: {id}")]
    DescriptorNotFound { id: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("API rate limit hit")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::BoardNotFound { .. } => ErrorCode::BoardNotFound,
            Self::DescriptorNotFound { .. } => ErrorCode::DescriptorNotFound,
            Self::Api(_) => ErrorCode::ApiError,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `boardsync init` to create the config and database".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Config already exists at {}. Use `--force` to overwrite.",
                path.display()
            )),

            Self::BoardNotFound { id } => Some(format!(
                "The API returned no board with id '{id}'. Check the board_id in your config \
                 and that the API token can see the board."
            )),

            Self::DescriptorNotFound { id } => Some(format!(
                "No mapping descriptor for '{id}'. Use `boardsync boards` to list configured \
                 boards, or add one to the config file."
            )),

            Self::RateLimited => Some(
                "The remote API throttled this run. Increase the inter-board cooldown \
                 or re-run later."
                    .to_string(),
            ),

            Self::Config(_) => {
                Some("Check the config file, or set BOARDSYNC_API_TOKEN for the API token".to_string())
            }

            Self::Api(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, exit code, and optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(
            Error::BoardNotFound {
                id: "1".to_string()
            }
            .exit_code(),
            3
        );
        assert_eq!(Error::Api("boom".to_string()).exit_code(), 5);
        assert_eq!(Error::RateLimited.exit_code(), 5);
        assert_eq!(Error::Config("bad".to_string()).exit_code(), 6);
    }

    #[test]
    fn test_structured_json_has_code_and_hint() {
        let err = Error::BoardNotFound {
            id: "42".to_string(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "BOARD_NOT_FOUND");
        assert!(json["error"]["hint"].as_str().unwrap().contains("42"));
    }
}
