//! Store location resolution.
//!
//! # Responsibility
//! - Pick the SQLite file path for the current deployment.
//! - Create the containing directory when it is missing.
//!
//! # Invariants
//! - Directory creation failures are returned to the caller unchanged.
//! - Resolution reads the environment only through the supplied lookup.

use crate::db::{DbError, DbResult};
use log::info;
use std::path::{Path, PathBuf};

/// Explicit store path override.
pub const DB_PATH_ENV: &str = "TRADESTAT_DB_PATH";
/// Set (to any value) on deployments with a read-only working directory.
pub const DEPLOYMENT_MARKER_ENV: &str = "TRADESTAT_DEPLOYMENT";

pub const DB_FILE_NAME: &str = "trade_data.db";
pub const LOCAL_DB_DIR: &str = "database";

/// Resolved store settings handed to [`crate::db::init_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Uses an explicit path; its parent directory is created when missing.
    pub fn at(db_path: impl Into<PathBuf>) -> DbResult<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self { db_path })
    }

    /// Resolves the store location from the process environment, relative to
    /// the current working directory.
    pub fn from_env() -> DbResult<Self> {
        Self::resolve(|key| std::env::var(key).ok(), Path::new("."))
    }

    /// Resolves the store location using `lookup` for environment access.
    ///
    /// Order: [`DB_PATH_ENV`] override, then [`DEPLOYMENT_MARKER_ENV`]
    /// (temporary directory), then `<local_root>/database/trade_data.db`.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        local_root: &Path,
    ) -> DbResult<Self> {
        if let Some(raw) = lookup(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                info!("event=store_resolve module=config status=ok source=override");
                return Self::at(trimmed);
            }
        }

        if lookup(DEPLOYMENT_MARKER_ENV).is_some() {
            info!("event=store_resolve module=config status=ok source=deployment");
            return Ok(Self {
                db_path: std::env::temp_dir().join(DB_FILE_NAME),
            });
        }

        let dir = local_root.join(LOCAL_DB_DIR);
        ensure_dir(&dir)?;
        info!("event=store_resolve module=config status=ok source=local");
        Ok(Self {
            db_path: dir.join(DB_FILE_NAME),
        })
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> DbResult<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| DbError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DB_FILE_NAME, DB_PATH_ENV, DEPLOYMENT_MARKER_ENV, LOCAL_DB_DIR};
    use crate::db::DbError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn local_path_creates_database_directory() {
        let root = tempfile::tempdir().unwrap();
        let config = StoreConfig::resolve(env(&[]), root.path()).unwrap();

        assert_eq!(
            config.db_path,
            root.path().join(LOCAL_DB_DIR).join(DB_FILE_NAME)
        );
        assert!(root.path().join(LOCAL_DB_DIR).is_dir());
    }

    #[test]
    fn deployment_marker_selects_temp_dir() {
        let root = tempfile::tempdir().unwrap();
        let config =
            StoreConfig::resolve(env(&[(DEPLOYMENT_MARKER_ENV, "1")]), root.path()).unwrap();

        assert_eq!(config.db_path, std::env::temp_dir().join(DB_FILE_NAME));
        assert!(!root.path().join(LOCAL_DB_DIR).exists());
    }

    #[test]
    fn explicit_override_wins_and_blank_override_is_ignored() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("nested").join("custom.db");
        let target_str = target.to_str().unwrap();

        let config = StoreConfig::resolve(
            env(&[(DB_PATH_ENV, target_str), (DEPLOYMENT_MARKER_ENV, "1")]),
            root.path(),
        )
        .unwrap();
        assert_eq!(config.db_path, target);
        assert!(root.path().join("nested").is_dir());

        let blank = StoreConfig::resolve(env(&[(DB_PATH_ENV, "   ")]), root.path()).unwrap();
        assert_eq!(
            blank.db_path,
            root.path().join(LOCAL_DB_DIR).join(DB_FILE_NAME)
        );
    }

    #[test]
    fn directory_creation_failure_propagates() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = StoreConfig::resolve(env(&[]), &blocker).unwrap_err();
        assert!(matches!(err, DbError::Io { .. }));
    }
}
