use herdbook_core::db::migrations::latest_version;
use herdbook_core::{RepoError, SqliteCowRepository, SqliteRecordRepository};
use rusqlite::Connection;

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCowRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteRecordRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("records"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE cows (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            number TEXT NOT NULL,
            sex TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteCowRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "cows",
            column: "birthday"
        })
    ));
}
