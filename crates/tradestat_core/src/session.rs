//! Session factory and session-scoped access.
//!
//! # Responsibility
//! - Hand out short-lived units of work bound to the store file.
//! - Guarantee every session releases its connection after use.
//!
//! # Invariants
//! - A session never holds an open transaction between calls; every write
//!   path begins and finishes its own explicit transaction.
//! - Sessions are independent connections; there is no pooling.
//! - A session is `Send` but is used by one caller at a time.

use crate::db::{open_connection, DbError, DbResult};
use crate::repo::trade_repo::SqliteTradeRecordRepository;
use log::{debug, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Produces sessions bound to one store file.
///
/// Cloning is cheap; clones share the same target path.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    db_path: Arc<PathBuf>,
}

impl SessionFactory {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Opens a new session. The caller owns it and must let it drop (or call
    /// [`Session::close`]) when the unit of work is done.
    pub fn open_session(&self) -> DbResult<Session> {
        let conn = open_connection(self.db_path.as_path())?;
        let session_id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!("event=session_open module=session status=ok session_id={session_id}");
        Ok(Session {
            conn,
            close_log: CloseLog {
                session_id,
                opened_at: Instant::now(),
            },
        })
    }

    /// Runs `f` with exactly one fresh session and closes it afterwards.
    ///
    /// The session is released on every exit path: normal return, an early
    /// `Err` from `f`, or a panic unwinding through this frame.
    pub fn with_session<T, E>(&self, f: impl FnOnce(&mut Session) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut session = self.open_session()?;
        f(&mut session)
    }
}

/// One unit of work against the store.
pub struct Session {
    // Declared first so the connection is closed before the close event fires.
    conn: Connection,
    close_log: CloseLog,
}

impl Session {
    pub fn id(&self) -> u64 {
        self.close_log.session_id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Borrows a trade record repository over this session's connection.
    pub fn trade_records(&mut self) -> SqliteTradeRecordRepository<'_> {
        SqliteTradeRecordRepository::new(&mut self.conn)
    }

    /// Closes the session explicitly, surfacing close failures.
    pub fn close(self) -> DbResult<()> {
        let Session { conn, close_log } = self;
        conn.close().map_err(|(_, err)| {
            warn!(
                "event=session_close module=session status=error session_id={} error={}",
                close_log.session_id, err
            );
            DbError::Sqlite(err)
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.close_log.session_id)
            .finish_non_exhaustive()
    }
}

struct CloseLog {
    session_id: u64,
    opened_at: Instant,
}

impl Drop for CloseLog {
    fn drop(&mut self) {
        debug!(
            "event=session_close module=session status=ok session_id={} duration_ms={}",
            self.session_id,
            self.opened_at.elapsed().as_millis()
        );
    }
}
