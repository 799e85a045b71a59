// src/db/sqlite.rs
// SQLite implementation of the query-execution and schema-discovery ports.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Column, Row as SqlxRow};
use tracing::{debug, info, warn};

use super::{Discovery, QueryExecutor, QueryResult, Row, SchemaProvider};
use crate::config::CONFIG;
use crate::error::{Error, Result};
use crate::schema::{ColumnInfo, Relationship, SchemaModel, TableInfo};

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Model-generated SQL runs read-only. Whole-word keyword check so
    /// CREATED_AT does not trip on CREATE.
    fn guard(sql: &str) -> Result<()> {
        let sql_upper = sql.trim().to_uppercase();
        if !sql_upper.starts_with("SELECT") && !sql_upper.starts_with("WITH") {
            return Err(Error::QueryExecution {
                sql: sql.to_string(),
                message: "Only SELECT queries are allowed".to_string(),
            });
        }

        let forbidden = [
            "DROP", "DELETE", "INSERT", "UPDATE", "ALTER", "CREATE", "TRUNCATE", "ATTACH",
            "PRAGMA",
        ];
        let words: Vec<&str> = sql_upper
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .collect();
        for word in forbidden {
            if words.contains(&word) {
                return Err(Error::QueryExecution {
                    sql: sql.to_string(),
                    message: format!("Query contains forbidden keyword: {}", word),
                });
            }
        }
        Ok(())
    }

    fn with_limit(sql: &str) -> String {
        if sql.to_uppercase().contains("LIMIT") {
            sql.to_string()
        } else {
            format!("{} LIMIT {}", sql.trim_end_matches(';').trim_end(), CONFIG.query_row_limit)
        }
    }

    /// SQLite types are loose (especially for aggregates), so try several
    /// decodings per cell. Everything comes out as plain JSON.
    fn decode_cell(row: &sqlx::sqlite::SqliteRow, i: usize) -> Value {
        if let Ok(v) = row.try_get::<i64, _>(i) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<f64, _>(i) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<bool, _>(i) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<String, _>(i) {
            return Value::from(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(i) {
            return Value::from(v);
        }
        Value::Null
    }

    async fn discover_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let pragma = format!("PRAGMA table_info(\"{}\")", table);
        let rows = sqlx::query(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::ColumnDiscovery {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name").unwrap_or_default();
            let data_type: String = row.try_get("type").unwrap_or_default();
            let notnull: i64 = row.try_get("notnull").unwrap_or(0);
            let pk: i64 = row.try_get("pk").unwrap_or(0);
            // An INTEGER single-column primary key is the rowid alias, the
            // closest thing SQLite has to an identity column.
            let is_identity = pk == 1 && data_type.to_uppercase() == "INTEGER";
            columns.push(ColumnInfo {
                name,
                data_type,
                nullable: notnull == 0,
                is_identity,
            });
        }
        Ok(columns)
    }

    async fn discover_foreign_keys(&self, table: &str) -> Vec<Relationship> {
        let pragma = format!("PRAGMA foreign_key_list(\"{}\")", table);
        let rows = match sqlx::query(&pragma).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                debug!("foreign_key_list failed for {}: {}", table, e);
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|row| {
                let target: String = row.try_get("table").ok()?;
                let source_column: String = row.try_get("from").ok()?;
                Some(Relationship {
                    source_table: table.to_string(),
                    source_column,
                    target_table: target,
                    inferred: false,
                })
            })
            .collect()
    }
}

/// Guess relationships from `_id` column naming when no declared foreign key
/// covers the column. `user_id` targets `user` or `users`, whichever exists.
fn infer_relationships(model: &SchemaModel, declared: &[Relationship]) -> Vec<Relationship> {
    let mut inferred = Vec::new();
    for (table_name, table) in &model.tables {
        for column in &table.columns {
            let lower = column.name.to_lowercase();
            let Some(base) = lower.strip_suffix("_id") else {
                continue;
            };
            if base.is_empty() {
                continue;
            }
            if declared
                .iter()
                .any(|r| r.source_table == *table_name && r.source_column == column.name)
            {
                continue;
            }
            let target = model
                .tables
                .keys()
                .find(|t| t.to_lowercase() == base || t.to_lowercase() == format!("{}s", base));
            if let Some(target) = target {
                if target != table_name {
                    inferred.push(Relationship {
                        source_table: table_name.clone(),
                        source_column: column.name.clone(),
                        target_table: target.clone(),
                        inferred: true,
                    });
                }
            }
        }
    }
    inferred
}

#[async_trait]
impl QueryExecutor for SqliteBackend {
    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        Self::guard(sql)?;
        let final_sql = Self::with_limit(sql);

        let rows = sqlx::query(&final_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::QueryExecution {
                sql: sql.to_string(),
                message: e.to_string(),
            })?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let data: Vec<Row> = rows
            .iter()
            .map(|row| {
                row.columns()
                    .iter()
                    .enumerate()
                    .map(|(i, col)| (col.name().to_string(), Self::decode_cell(row, i)))
                    .collect()
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows: data,
        })
    }
}

#[async_trait]
impl SchemaProvider for SqliteBackend {
    async fn introspect(&self) -> Result<Discovery> {
        let tables: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT name, type FROM sqlite_master
            WHERE type IN ('table', 'view')
              AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::TableDiscovery(e.to_string()))?;

        let mut discovery = Discovery::default();
        for (name, kind) in &tables {
            let table_type = if kind == "view" { "VIEW" } else { "BASE TABLE" };
            let columns = match self.discover_columns(name).await {
                Ok(columns) => columns,
                Err(e) => {
                    // Keep the table with empty columns rather than failing
                    // the whole discovery.
                    warn!("Failed to get columns for table {}: {}", name, e);
                    discovery.errors.push(e);
                    Vec::new()
                }
            };
            discovery.model.tables.insert(
                name.clone(),
                TableInfo {
                    table_type: table_type.to_string(),
                    columns,
                },
            );
        }

        let mut declared = Vec::new();
        for (name, _) in &tables {
            declared.extend(self.discover_foreign_keys(name).await);
        }
        let inferred = infer_relationships(&discovery.model, &declared);
        discovery.model.relationships = declared;
        discovery.model.relationships.extend(inferred);
        discovery.model.prune_dangling_relationships();

        info!(
            "Schema introspection complete: {} tables, {} relationships",
            discovery.model.tables.len(),
            discovery.model.relationships.len()
        );
        Ok(discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table(columns: &[&str]) -> TableInfo {
        TableInfo {
            table_type: "BASE TABLE".to_string(),
            columns: columns
                .iter()
                .map(|name| ColumnInfo {
                    name: name.to_string(),
                    data_type: "INTEGER".to_string(),
                    nullable: true,
                    is_identity: false,
                })
                .collect(),
        }
    }

    #[test]
    fn test_guard_rejects_writes() {
        assert!(SqliteBackend::guard("DELETE FROM users").is_err());
        assert!(SqliteBackend::guard("SELECT created_at FROM users").is_ok());
        assert!(SqliteBackend::guard("SELECT 1; DROP TABLE users").is_err());
    }

    #[test]
    fn test_with_limit_only_when_absent() {
        assert!(SqliteBackend::with_limit("SELECT * FROM t").ends_with("LIMIT 1000"));
        assert_eq!(
            SqliteBackend::with_limit("SELECT * FROM t LIMIT 5"),
            "SELECT * FROM t LIMIT 5"
        );
    }

    #[test]
    fn test_infer_relationships_singular_and_plural() {
        let mut tables = BTreeMap::new();
        tables.insert("users".to_string(), table(&["id"]));
        tables.insert("orders".to_string(), table(&["id", "user_id", "widget_id"]));
        let model = SchemaModel {
            tables,
            relationships: Vec::new(),
        };

        let inferred = infer_relationships(&model, &[]);
        assert_eq!(inferred.len(), 1);
        assert_eq!(inferred[0].source_column, "user_id");
        assert_eq!(inferred[0].target_table, "users");
        assert!(inferred[0].inferred);
    }

    #[test]
    fn test_infer_skips_declared_foreign_keys() {
        let mut tables = BTreeMap::new();
        tables.insert("users".to_string(), table(&["id"]));
        tables.insert("orders".to_string(), table(&["id", "user_id"]));
        let model = SchemaModel {
            tables,
            relationships: Vec::new(),
        };
        let declared = vec![Relationship {
            source_table: "orders".to_string(),
            source_column: "user_id".to_string(),
            target_table: "users".to_string(),
            inferred: false,
        }];

        assert!(infer_relationships(&model, &declared).is_empty());
    }
}
