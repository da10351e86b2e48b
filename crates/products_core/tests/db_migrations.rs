use products_core::db::migrations::latest_version;
use products_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("in-memory db should open");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "products");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("products.db");

    let conn_first = open_db(&path).expect("db file should open");
    conn_first
        .execute("INSERT INTO products (name, price) VALUES ('kept', 1.5);", [])
        .expect("statement should run");
    drop(conn_first);

    let conn_second = open_db(&path).expect("db file should open");
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM products;", [], |row| row.get(0))
        .expect("row should be readable");
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("connection should open");
    conn.execute_batch("PRAGMA user_version = 999;").expect("sql batch should run");
    drop(conn);

    let err = open_db(&path).expect_err("open_db should fail");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn new_rows_default_to_available() {
    let conn = open_db_in_memory().expect("in-memory db should open");
    conn.execute("INSERT INTO products (name, price) VALUES ('x', 0);", [])
        .expect("statement should run");

    let available: i64 = conn
        .query_row("SELECT available FROM products;", [], |row| row.get(0))
        .expect("row should be readable");
    assert_eq!(available, 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("row should be readable")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("row should be readable");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
