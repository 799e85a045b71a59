// src/db/mod.rs
// Query execution and schema discovery ports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod sqlite;

pub use sqlite::SqliteBackend;

use crate::error::{Error, Result};
use crate::schema::SchemaModel;

/// One result row, keyed by column name. Values are already normalized to
/// plain JSON (numbers, strings, bools, nulls) at decode time so everything
/// downstream can serialize without special cases.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Returned {} rows, {} columns",
            self.row_count(),
            self.column_count()
        )
    }
}

/// Executes model-generated SQL. The loop treats a failure here as a skipped
/// iteration, never a session abort.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResult>;
}

/// Schema discovery output. Column-level failures degrade the model (table
/// kept with empty columns) instead of failing discovery; they are returned
/// here so the caller can log them into the session artifacts.
#[derive(Debug, Default)]
pub struct Discovery {
    pub model: SchemaModel,
    pub errors: Vec<Error>,
}

/// Discovers the schema once, before the loop starts. The core never
/// re-introspects mid-session.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn introspect(&self) -> Result<Discovery>;
}
