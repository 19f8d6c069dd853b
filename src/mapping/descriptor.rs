//! Declarative board-to-table mapping descriptors.
//!
//! One descriptor per board replaces per-board mapping code: it names the
//! source board, the target table, the sync mode, and an ordered list of
//! `(source column id, target field, semantic kind)` triples interpreted
//! by the generic mapper. Column ids are opaque per-board configuration
//! strings and can be revised in the config file without touching
//! extraction or normalization logic.

use crate::storage::TargetTable;
use serde::{Deserialize, Serialize};

/// How a board-sync run writes to its target table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Clear the target table, then insert every mapped record.
    FullRefresh,
    /// Look up each record by external key; update if found, else insert.
    #[default]
    IncrementalUpsert,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullRefresh => write!(f, "full-refresh"),
            Self::IncrementalUpsert => write!(f, "incremental-upsert"),
        }
    }
}

/// Semantic kind of a mapped field; selects the extractor and, for
/// enumerated kinds, the normalizer rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    TaskStatus,
    PaymentStatus,
    Priority,
    Currency,
    DealStage,
    ProjectStatus,
    People,
    Relation,
}

/// One `(source column id, target field, kind)` mapping entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMap {
    /// Opaque column id as configured on the source board.
    pub column_id: String,
    /// Target table column name.
    pub field: String,
    /// Semantic kind driving extraction/normalization.
    pub kind: FieldKind,
}

impl FieldMap {
    fn new(column_id: &str, field: &str, kind: FieldKind) -> Self {
        Self {
            column_id: column_id.to_string(),
            field: field.to_string(),
            kind,
        }
    }
}

/// Mapping descriptor for one board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDescriptor {
    /// Source board identifier.
    pub board_id: String,
    /// Target table.
    pub table: TargetTable,
    /// Sync mode for this board.
    #[serde(default)]
    pub mode: SyncMode,
    /// Column receiving the parent item's name when a subitem is
    /// flattened into the parent board's table. `None` drops subitems.
    #[serde(default = "default_parent_field")]
    pub parent_field: Option<String>,
    /// Ordered field mappings.
    pub fields: Vec<FieldMap>,
}

fn default_parent_field() -> Option<String> {
    Some("parent_name".to_string())
}

/// Built-in descriptors for the five stock board layouts.
///
/// These match the column ids the source account was provisioned with;
/// accounts with different layouts override them in the config file.
#[must_use]
pub fn builtin_descriptors() -> Vec<BoardDescriptor> {
    vec![
        BoardDescriptor {
            board_id: "clients".to_string(),
            table: TargetTable::Clients,
            mode: SyncMode::IncrementalUpsert,
            parent_field: default_parent_field(),
            fields: vec![
                FieldMap::new("email", "email", FieldKind::Text),
                FieldMap::new("phone", "phone", FieldKind::Text),
                FieldMap::new("status", "status", FieldKind::ProjectStatus),
                FieldMap::new("long_text", "notes", FieldKind::Text),
            ],
        },
        BoardDescriptor {
            board_id: "tasks".to_string(),
            table: TargetTable::Tasks,
            mode: SyncMode::IncrementalUpsert,
            parent_field: default_parent_field(),
            fields: vec![
                FieldMap::new("status", "status", FieldKind::TaskStatus),
                FieldMap::new("priority__1", "priority", FieldKind::Priority),
                FieldMap::new("date4", "due_at", FieldKind::Date),
                FieldMap::new("numbers__1", "hours", FieldKind::Number),
                FieldMap::new("person", "assignee_ids", FieldKind::People),
                FieldMap::new("connect_boards", "project_ids", FieldKind::Relation),
                FieldMap::new("text8", "notes", FieldKind::Text),
            ],
        },
        BoardDescriptor {
            board_id: "payments".to_string(),
            table: TargetTable::Payments,
            mode: SyncMode::IncrementalUpsert,
            parent_field: default_parent_field(),
            fields: vec![
                FieldMap::new("numbers", "amount", FieldKind::Number),
                FieldMap::new("status_1", "currency", FieldKind::Currency),
                FieldMap::new("status", "status", FieldKind::PaymentStatus),
                FieldMap::new("date", "paid_at", FieldKind::Date),
                FieldMap::new("connect_boards", "client_ids", FieldKind::Relation),
                FieldMap::new("text", "invoice_ref", FieldKind::Text),
            ],
        },
        BoardDescriptor {
            board_id: "deals".to_string(),
            table: TargetTable::Deals,
            mode: SyncMode::IncrementalUpsert,
            parent_field: default_parent_field(),
            fields: vec![
                FieldMap::new("status", "stage", FieldKind::DealStage),
                FieldMap::new("numbers", "value", FieldKind::Number),
                FieldMap::new("status_1", "currency", FieldKind::Currency),
                FieldMap::new("date", "close_at", FieldKind::Date),
                FieldMap::new("connect_boards", "contact_ids", FieldKind::Relation),
                FieldMap::new("long_text", "notes", FieldKind::Text),
            ],
        },
        BoardDescriptor {
            board_id: "projects".to_string(),
            table: TargetTable::Projects,
            mode: SyncMode::IncrementalUpsert,
            parent_field: default_parent_field(),
            fields: vec![
                FieldMap::new("status", "status", FieldKind::ProjectStatus),
                FieldMap::new("timeline_start", "start_at", FieldKind::Date),
                FieldMap::new("timeline_end", "end_at", FieldKind::Date),
                FieldMap::new("numbers", "budget", FieldKind::Number),
                FieldMap::new("connect_boards", "client_ids", FieldKind::Relation),
                FieldMap::new("long_text", "notes", FieldKind::Text),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_descriptors_cover_all_tables() {
        let descriptors = builtin_descriptors();
        assert_eq!(descriptors.len(), 5);

        // Every mapped target field must be a real column of its table.
        for desc in &descriptors {
            for fm in &desc.fields {
                assert!(
                    desc.table.is_allowed_column(&fm.field),
                    "{} is not a column of {}",
                    fm.field,
                    desc.table
                );
            }
            if let Some(parent) = &desc.parent_field {
                assert!(desc.table.is_allowed_column(parent));
            }
        }
    }

    #[test]
    fn test_descriptor_deserializes_from_config_json() {
        let json = r#"{
            "board_id": "4412345678",
            "table": "tasks",
            "mode": "full-refresh",
            "fields": [
                {"column_id": "status_x", "field": "status", "kind": "task_status"}
            ]
        }"#;
        let desc: BoardDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.table, TargetTable::Tasks);
        assert_eq!(desc.mode, SyncMode::FullRefresh);
        assert_eq!(desc.parent_field.as_deref(), Some("parent_name"));
        assert_eq!(desc.fields[0].kind, FieldKind::TaskStatus);
    }

    #[test]
    fn test_sync_mode_display() {
        assert_eq!(SyncMode::FullRefresh.to_string(), "full-refresh");
        assert_eq!(SyncMode::IncrementalUpsert.to_string(), "incremental-upsert");
    }
}
