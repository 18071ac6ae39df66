//! Process configuration resolved from environment variables.
//!
//! | Variable           | Default                   |
//! |--------------------|---------------------------|
//! | `MERLIN_DB_PATH`   | `./merlin.sqlite3`        |
//! | `MERLIN_LOG_LEVEL` | [`default_log_level`]     |
//! | `MERLIN_LOG_DIR`   | unset (logging disabled)  |

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "MERLIN_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "MERLIN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MERLIN_LOG_DIR";

/// File name used when only a data directory is known.
pub const DB_FILE_NAME: &str = "merlin.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: resolve_db_path("."),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: read(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Joins the default database file name onto a data directory.
pub fn resolve_db_path(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(DB_FILE_NAME)
}
