//! Tests against a live node.
//!
//! Skipped unless CQLPIPE_TEST_HOSTS is set.

use cqlpipe::config::ConnectionConfig;
use cqlpipe::db::{self, Backend, ColumnType, ColumnValue, Consistency, ResultSet};
use cqlpipe::error::QueryError;

/// Helper to get test hosts from environment.
fn get_test_hosts() -> Option<Vec<String>> {
    let hosts = std::env::var("CQLPIPE_TEST_HOSTS").ok()?;
    Some(cqlpipe::config::split_host_list(&hosts))
}

/// Helper to create a test backend.
async fn get_test_backend() -> Option<Box<dyn Backend>> {
    let config = ConnectionConfig {
        hosts: get_test_hosts()?,
        ..Default::default()
    };
    db::connect(&config).await.ok()
}

#[tokio::test]
async fn test_select_release_version() {
    let Some(backend) = get_test_backend().await else {
        eprintln!("Skipping test: CQLPIPE_TEST_HOSTS not set");
        return;
    };

    let result = backend
        .execute("SELECT release_version FROM system.local;", Consistency::One)
        .await
        .unwrap();

    match result {
        ResultSet::Rows { metadata, rows } => {
            assert_eq!(metadata.len(), 1);
            assert_eq!(metadata[0].name, "release_version");
            assert_eq!(metadata[0].column_type, ColumnType::Varchar);
            assert_eq!(rows.len(), 1);
            assert!(matches!(rows[0][0], ColumnValue::Text(_)));
        }
        other => panic!("Expected rows, got {:?}", other),
    }

    backend.close().await.unwrap();
}

#[tokio::test]
async fn test_schema_round() {
    let Some(backend) = get_test_backend().await else {
        eprintln!("Skipping test: CQLPIPE_TEST_HOSTS not set");
        return;
    };

    let create = backend
        .execute(
            "CREATE KEYSPACE IF NOT EXISTS cqlpipe_test WITH replication = \
             {'class': 'SimpleStrategy', 'replication_factor': 1};",
            Consistency::One,
        )
        .await
        .unwrap();
    assert!(matches!(
        create,
        ResultSet::SchemaChange { .. } | ResultSet::Void
    ));

    db::use_keyspace(backend.as_ref(), "cqlpipe_test").await.unwrap();

    backend
        .execute(
            "CREATE TABLE IF NOT EXISTS items (id int PRIMARY KEY, label text, data blob);",
            Consistency::One,
        )
        .await
        .unwrap();
    backend
        .execute(
            "INSERT INTO items (id, label, data) VALUES (1, '', 0x01ab00);",
            Consistency::One,
        )
        .await
        .unwrap();

    let result = backend
        .execute("SELECT id, label, data FROM items WHERE id = 1;", Consistency::One)
        .await
        .unwrap();
    let output = cqlpipe::output::render_to_string(&result).unwrap();
    assert!(output.contains("| 1  |       | 0x01ab00 |"));

    backend
        .execute("DROP KEYSPACE cqlpipe_test;", Consistency::One)
        .await
        .unwrap();
    backend.close().await.unwrap();
}

#[tokio::test]
async fn test_server_error() {
    let Some(backend) = get_test_backend().await else {
        eprintln!("Skipping test: CQLPIPE_TEST_HOSTS not set");
        return;
    };

    let err = backend
        .execute("SELECT * FROM no_such_keyspace.t;", Consistency::One)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Server { .. }));

    backend.close().await.unwrap();
}
