//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections with the store's flags.
//! - Optionally apply the schema registry before returning the connection.
//!
//! # Invariants
//! - Connections are opened with `SQLITE_OPEN_NO_MUTEX`; a connection is
//!   `Send` and may move between threads, but is used by one caller at a time.
//! - Every connection waits on the store's file lock instead of failing fast.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{debug, error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a raw connection to the store file without touching the schema.
///
/// This is the engine binding used by every session. The file is created
/// when missing; its parent directory must already exist.
pub fn open_connection(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(path, flags)?;
    configure_connection(&conn)?;
    debug!(
        "event=db_connect module=db status=ok path={}",
        path.display()
    );
    Ok(conn)
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let result: DbResult<Connection> = open_connection(path).and_then(|mut conn| {
        apply_migrations(&mut conn)?;
        Ok(conn)
    });
    log_open_result("file", started_at, &result);
    result
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result: DbResult<Connection> = Connection::open_in_memory()
        .map_err(Into::into)
        .and_then(|mut conn| {
            configure_connection(&conn)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });
    log_open_result("memory", started_at, &result);
    result
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

fn log_open_result(mode: &str, started_at: Instant, result: &DbResult<Connection>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
