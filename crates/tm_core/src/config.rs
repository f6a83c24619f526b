//! Filesystem locations and application constants.
//!
//! # Responsibility
//! - Resolve the per-user data directory, database file and log directory.
//! - Keep path policy out of the store so tests can inject temp paths.
//!
//! # Invariants
//! - `TM_HOME` (when set and non-empty) wins over the home directory default.
//! - Resolution never touches the filesystem; directories are created by
//!   `db::open_db` and `logging::init_logging`.

use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "tm";
pub const DATA_DIR_NAME: &str = ".tm";
pub const DB_FILE_NAME: &str = "tasks.db";
pub const LOG_DIR_NAME: &str = "logs";
pub const HOME_ENV: &str = "TM_HOME";
pub const LOG_LEVEL_ENV: &str = "TM_LOG";

/// Resolved locations for one `tm` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Lays out the database and log directory under `data_dir`.
    pub fn under(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
        }
    }

    /// Resolves paths from `TM_HOME` or `~/.tm`.
    ///
    /// Falls back to a relative `.tm` directory when no home directory is
    /// known.
    pub fn resolve() -> Self {
        Self::resolve_with(std::env::var_os(HOME_ENV).map(PathBuf::from), dirs::home_dir())
    }

    /// Uses `db_path` as-is and keeps logs next to it.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let data_dir = db_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_dir: data_dir.join(LOG_DIR_NAME),
            data_dir,
            db_path,
        }
    }

    fn resolve_with(override_dir: Option<PathBuf>, home: Option<PathBuf>) -> Self {
        if let Some(dir) = override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            return Self::under(dir);
        }
        let base = home.unwrap_or_default();
        Self::under(base.join(DATA_DIR_NAME))
    }
}
