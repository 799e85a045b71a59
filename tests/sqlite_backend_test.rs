// tests/sqlite_backend_test.rs
// Schema discovery and query execution against a real SQLite file.

use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

use datascout::db::{QueryExecutor, SchemaProvider, SqliteBackend};
use datascout::error::Error;
use datascout::schema::SchemaView;

async fn seeded_backend() -> (tempfile::TempDir, SqliteBackend) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scout.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let setup = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("create test database");
    sqlx::query(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL
        )
        "#,
    )
    .execute(&setup)
    .await
    .unwrap();
    sqlx::query(
        r#"
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER REFERENCES users(id),
            amount REAL
        )
        "#,
    )
    .execute(&setup)
    .await
    .unwrap();
    sqlx::query("INSERT INTO users (id, email) VALUES (1, 'a@example.com'), (2, 'b@example.com')")
        .execute(&setup)
        .await
        .unwrap();
    sqlx::query("INSERT INTO orders (id, user_id, amount) VALUES (1, 1, 9.5), (2, 1, 20.0)")
        .execute(&setup)
        .await
        .unwrap();
    setup.close().await;

    let backend = SqliteBackend::connect(&url).await.expect("connect");
    (dir, backend)
}

#[tokio::test]
async fn introspection_discovers_tables_columns_and_foreign_keys() {
    let (_dir, backend) = seeded_backend().await;
    let discovery = backend.introspect().await.unwrap();
    let model = discovery.model;

    assert!(discovery.errors.is_empty());
    assert_eq!(model.tables.len(), 2);
    assert!(model.validate());

    let users = &model.tables["users"];
    assert_eq!(users.table_type, "BASE TABLE");
    let id = users.columns.iter().find(|c| c.name == "id").unwrap();
    assert!(id.is_identity);
    let email = users.columns.iter().find(|c| c.name == "email").unwrap();
    assert!(!email.nullable);

    // declared FK wins over naming inference
    let rel = model
        .relationships
        .iter()
        .find(|r| r.source_table == "orders" && r.source_column == "user_id")
        .unwrap();
    assert_eq!(rel.target_table, "users");
    assert!(!rel.inferred);
    assert_eq!(model.relationships.len(), 1);
}

#[tokio::test]
async fn execute_returns_named_normalized_rows() {
    let (_dir, backend) = seeded_backend().await;
    let result = backend
        .execute("SELECT COUNT(*) AS user_count FROM users")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["user_count"]);
    assert_eq!(result.rows[0]["user_count"], serde_json::json!(2));
    assert_eq!(result.summary(), "Returned 1 rows, 1 columns");
}

#[tokio::test]
async fn execute_decodes_floats_and_text() {
    let (_dir, backend) = seeded_backend().await;
    let result = backend
        .execute("SELECT amount, user_id FROM orders ORDER BY id")
        .await
        .unwrap();

    assert_eq!(result.row_count(), 2);
    assert_eq!(result.rows[0]["amount"], serde_json::json!(9.5));
    assert_eq!(result.rows[0]["user_id"], serde_json::json!(1));
}

#[tokio::test]
async fn execute_rejects_writes_with_query_error() {
    let (_dir, backend) = seeded_backend().await;
    let err = backend.execute("DELETE FROM users").await.unwrap_err();
    match err {
        Error::QueryExecution { sql, .. } => assert_eq!(sql, "DELETE FROM users"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn execute_surfaces_sqlite_errors_nonfatally() {
    let (_dir, backend) = seeded_backend().await;
    let err = backend.execute("SELECT * FROM missing_table").await.unwrap_err();
    match err {
        Error::QueryExecution { message, .. } => {
            assert!(message.contains("missing_table") || message.contains("no such table"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn subset_view_over_discovered_schema() {
    let (_dir, backend) = seeded_backend().await;
    let discovery = backend.introspect().await.unwrap();
    let view = SchemaView::subset(Arc::new(discovery.model), ["orders"]);

    assert_eq!(view.table_count(), 1);
    assert_eq!(view.relationship_count(), 0);
    assert!(view.render().contains("TABLE orders"));
    assert!(!view.render().contains("TABLE users"));
}
