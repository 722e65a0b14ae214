use rusqlite::Connection;
use tradestat_core::db::migrations::{current_user_version, latest_version};
use tradestat_core::db::schema::{index_names, table_exists, TRADE_RECORDS_TABLE};
use tradestat_core::db::{open_db, open_db_in_memory};
use tradestat_core::{bootstrap_schema, init_store, DbError, SessionFactory, StoreConfig};

#[test]
fn open_db_in_memory_materializes_trade_records() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(table_exists(&conn, TRADE_RECORDS_TABLE).unwrap());
    assert_eq!(
        index_names(&conn, TRADE_RECORDS_TABLE).unwrap(),
        vec![
            "ix_trade_records_hs_10_code",
            "ix_trade_records_hs_2_code",
            "ix_trade_records_hs_4_code",
            "ix_trade_records_hs_6_code",
            "ix_trade_records_year",
        ]
    );
}

#[test]
fn bootstrap_twice_creates_no_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let factory = SessionFactory::new(dir.path().join("trade_data.db"));

    bootstrap_schema(&factory).unwrap();
    bootstrap_schema(&factory).unwrap();

    let conn = Connection::open(factory.db_path()).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [TRADE_RECORDS_TABLE],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1);
    assert_eq!(index_names(&conn, TRADE_RECORDS_TABLE).unwrap().len(), 5);
}

#[test]
fn init_store_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("nested").join("trade_data.db"),
    };

    let factory = init_store(&config).unwrap();

    assert!(dir.path().join("nested").is_dir());
    let session = factory.open_session().unwrap();
    assert!(table_exists(session.connection(), TRADE_RECORDS_TABLE).unwrap());
}

#[test]
fn init_store_tolerates_schema_bootstrap_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let factory = init_store(&StoreConfig { db_path: path }).unwrap();

    let err = bootstrap_schema(&factory).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
}

#[test]
fn init_store_propagates_directory_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let config = StoreConfig {
        db_path: blocker.join("trade_data.db"),
    };
    let err = init_store(&config).unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newer.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 7;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 7);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}
