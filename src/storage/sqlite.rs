//! SQLite storage implementation.
//!
//! The store adapter the sync engine persists through. Writes are
//! table-scoped: clearing or upserting one board's target table never
//! touches another board's rows. Updates are sparse: only the fields
//! present on the incoming record are written, so an incremental upsert
//! never overwrites previously populated columns with nulls.

use crate::error::{Error, Result};
use crate::model::{FieldValue, Record};
use crate::storage::schema::apply_schema;
use crate::storage::TargetTable;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// Outcome of an upsert: whether a new row was created or an existing one
/// (matched by external key) was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// One row of the `sync_runs` log table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncRun {
    pub board_id: String,
    pub table_name: String,
    pub mode: String,
    pub outcome: String,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub started_at: i64,
    pub finished_at: i64,
}

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Reject any record field that is not a writable column of `table`.
    fn validate_fields(table: TargetTable, record: &Record) -> Result<()> {
        for (column, _) in &record.fields {
            if !table.is_allowed_column(column) {
                return Err(Error::InvalidArgument(format!(
                    "field '{column}' is not a column of table '{table}'"
                )));
            }
        }
        Ok(())
    }

    /// Insert a record as a new row.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is not a valid column or the insert
    /// fails (e.g. a UNIQUE violation on the external key).
    pub fn insert_record(&mut self, table: TargetTable, record: &Record) -> Result<i64> {
        Self::validate_fields(table, record)?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut columns = vec!["external_id", "name"];
        let mut values: Vec<Value> = vec![
            record
                .external_id
                .as_ref()
                .map_or(Value::Null, |id| Value::Text(id.clone())),
            Value::Text(record.name.clone()),
        ];
        for (column, value) in &record.fields {
            columns.push(column.as_str());
            values.push(to_sql_value(value));
        }
        columns.push("created_at");
        values.push(Value::Integer(now));
        columns.push("updated_at");
        values.push(Value::Integer(now));

        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.as_str(),
            columns.join(", "),
            placeholders.join(", ")
        );

        self.conn
            .execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert or update a record, correlated by external key.
    ///
    /// A record without an external key is always inserted. Updates touch
    /// only the fields present on the record plus `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is not a valid column or the write fails.
    pub fn upsert_record(&mut self, table: TargetTable, record: &Record) -> Result<UpsertOutcome> {
        Self::validate_fields(table, record)?;

        let Some(external_id) = record.external_id.as_deref() else {
            self.insert_record(table, record)?;
            return Ok(UpsertOutcome::Inserted);
        };

        let sql = format!(
            "SELECT id FROM {} WHERE external_id = ?1",
            table.as_str()
        );
        let existing: Option<i64> = self
            .conn
            .query_row(&sql, [external_id], |row| row.get(0))
            .optional()?;

        match existing {
            Some(row_id) => {
                let now = chrono::Utc::now().timestamp_millis();
                let mut assignments = vec!["name = ?1".to_string()];
                let mut values: Vec<Value> = vec![Value::Text(record.name.clone())];
                for (column, value) in &record.fields {
                    values.push(to_sql_value(value));
                    assignments.push(format!("{column} = ?{}", values.len()));
                }
                values.push(Value::Integer(now));
                assignments.push(format!("updated_at = ?{}", values.len()));
                values.push(Value::Integer(row_id));
                let sql = format!(
                    "UPDATE {} SET {} WHERE id = ?{}",
                    table.as_str(),
                    assignments.join(", "),
                    values.len()
                );
                self.conn
                    .execute(&sql, rusqlite::params_from_iter(values))?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.insert_record(table, record)?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Delete every row of a target table (full-refresh precondition).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear_table(&mut self, table: TargetTable) -> Result<usize> {
        let sql = format!("DELETE FROM {}", table.as_str());
        Ok(self.conn.execute(&sql, [])?)
    }

    /// Count rows in a target table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self, table: TargetTable) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ==================
    // Run Log
    // ==================

    /// Append one board-sync run to the run log.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_run(&mut self, run: &SyncRun) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_runs (board_id, table_name, mode, outcome, imported, updated, skipped, errors, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                run.board_id,
                run.table_name,
                run.mode,
                run.outcome,
                run.imported,
                run.updated,
                run.skipped,
                run.errors,
                run.started_at,
                run.finished_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent runs, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<SyncRun>> {
        let mut stmt = self.conn.prepare(
            "SELECT board_id, table_name, mode, outcome, imported, updated, skipped, errors, started_at, finished_at
             FROM sync_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(SyncRun {
                board_id: row.get(0)?,
                table_name: row.get(1)?,
                mode: row.get(2)?,
                outcome: row.get(3)?,
                imported: row.get::<_, i64>(4)? as usize,
                updated: row.get::<_, i64>(5)? as usize,
                skipped: row.get::<_, i64>(6)? as usize,
                errors: row.get::<_, i64>(7)? as usize,
                started_at: row.get(8)?,
                finished_at: row.get(9)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

/// Convert a normalized field value to its SQLite form.
fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Number(n) => Value::Real(*n),
        FieldValue::Timestamp(t) => Value::Integer(*t),
    }
}
