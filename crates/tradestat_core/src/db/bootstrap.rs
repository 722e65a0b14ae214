//! Process-start initialization of the store.
//!
//! # Invariants
//! - `bootstrap_schema` is idempotent.
//! - `init_store` never fails because of schema problems; those surface later
//!   as operation errors.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::{ensure_dir, StoreConfig};
use crate::session::SessionFactory;
use log::{error, info};
use std::time::Instant;

/// Ensures the `trade_records` table and its indexes exist.
pub fn bootstrap_schema(factory: &SessionFactory) -> DbResult<()> {
    factory.with_session(|session| {
        apply_migrations(session.connection_mut())?;
        Ok(())
    })
}

/// Builds the session factory for `config` and materializes the schema.
///
/// Call once from the host's startup routine and share the returned factory.
///
/// # Errors
/// - Returns an error when the store directory cannot be prepared.
///
/// Schema bootstrap failures are logged and swallowed.
pub fn init_store(config: &StoreConfig) -> DbResult<SessionFactory> {
    let started_at = Instant::now();
    if let Some(parent) = config.db_path.parent() {
        ensure_dir(parent)?;
    }

    let factory = SessionFactory::new(config.db_path.clone());
    match bootstrap_schema(&factory) {
        Ok(()) => info!(
            "event=schema_bootstrap module=db status=ok path={} duration_ms={}",
            config.db_path.display(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_bootstrap module=db status=error path={} duration_ms={} error={}",
            config.db_path.display(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    Ok(factory)
}
