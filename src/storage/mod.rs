//! SQLite storage layer.
//!
//! - [`schema`] - DDL and pragma setup
//! - [`sqlite`] - the [`SqliteStorage`] store adapter
//! - [`TargetTable`] - closed set of target tables with allowed columns
//!
//! All dynamic SQL in this layer is built exclusively from
//! [`TargetTable`] names and their allowed-column lists; record field
//! names never reach a statement unvalidated.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStorage, SyncRun, UpsertOutcome};

use serde::{Deserialize, Serialize};

/// The closed set of target tables, one per board type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTable {
    Clients,
    Tasks,
    Payments,
    Deals,
    Projects,
}

impl TargetTable {
    /// Table name as it appears in the schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Tasks => "tasks",
            Self::Payments => "payments",
            Self::Deals => "deals",
            Self::Projects => "projects",
        }
    }

    /// Columns a mapper may write to, excluding the surrogate id and the
    /// audit timestamps (those are owned by the store).
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Clients => &[
                "external_id",
                "name",
                "email",
                "phone",
                "status",
                "notes",
                "parent_name",
            ],
            Self::Tasks => &[
                "external_id",
                "name",
                "status",
                "priority",
                "due_at",
                "hours",
                "assignee_ids",
                "project_ids",
                "notes",
                "parent_name",
            ],
            Self::Payments => &[
                "external_id",
                "name",
                "amount",
                "currency",
                "status",
                "paid_at",
                "client_ids",
                "invoice_ref",
                "parent_name",
            ],
            Self::Deals => &[
                "external_id",
                "name",
                "stage",
                "value",
                "currency",
                "close_at",
                "contact_ids",
                "notes",
                "parent_name",
            ],
            Self::Projects => &[
                "external_id",
                "name",
                "status",
                "start_at",
                "end_at",
                "budget",
                "client_ids",
                "notes",
                "parent_name",
            ],
        }
    }

    /// Whether `column` is a writable column of this table.
    #[must_use]
    pub fn is_allowed_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl std::fmt::Display for TargetTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clients" => Ok(Self::Clients),
            "tasks" => Ok(Self::Tasks),
            "payments" => Ok(Self::Payments),
            "deals" => Ok(Self::Deals),
            "projects" => Ok(Self::Projects),
            _ => Err(format!("Unknown target table: {s}")),
        }
    }
}
