//! SQLite store adapter.
//!
//! Implements [`StorePort`] over a single `rusqlite` connection.  One
//! connection per repository serialises every access; the repository is
//! the only owner.
//!
//! - **file** — `SqliteStore::open(path)` for the real database.
//! - **memory** — `SqliteStore::in_memory()` for tests and dry runs.

use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::app::ports::{Row, RunSummary, SqlValue, StoreError, StorePort};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            warn!("SqliteStore: cannot open {}: {}", path.display(), e);
            StoreError::Unavailable
        })?;
        conn.busy_timeout(Duration::from_secs(5)).map_err(query_err)?;
        info!("SqliteStore: opened {}", path.display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            warn!("SqliteStore: cannot open in-memory database: {}", e);
            StoreError::Unavailable
        })?;
        Ok(Self { conn })
    }
}

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn to_sql(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
    }
}

/// Column values the plant schema never writes are surfaced as NULL or
/// lossy text with a warning, so row decoding flags them as corrupt.
fn from_sql(column: &str, value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Blob(bytes) => {
            warn!("SqliteStore: column '{}' holds a {}-byte blob, read as NULL", column, bytes.len());
            SqlValue::Null
        }
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Text(v.to_string()),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text.to_owned()),
            Err(_) => {
                warn!("SqliteStore: column '{}' holds invalid UTF-8, read lossily", column);
                SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        },
    }
}

impl StorePort for SqliteStore {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql).map_err(query_err)
    }

    fn query_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(query_err)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql)))
            .map_err(query_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = row.get_ref(i).map_err(query_err)?;
                columns.push((name.clone(), from_sql(name, value)));
            }
            out.push(Row::new(columns));
        }
        Ok(out)
    }

    fn run(&mut self, sql: &str, params: &[SqlValue]) -> Result<RunSummary, StoreError> {
        let changes = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sql)))
            .map_err(query_err)?;
        Ok(RunSummary {
            changes,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }
}
