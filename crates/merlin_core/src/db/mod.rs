//! Connection setup and schema versioning for the workshop database.
//!
//! Every connection handed to a repository comes from [`open_db`] or
//! [`open_db_in_memory`]. Those return only after foreign keys are on, the
//! busy timeout is set and the schema sits at
//! [`migrations::latest_version`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while preparing a connection, tagged with the setup phase.
#[derive(Debug)]
pub enum DbError {
    /// SQLite could not open the `mode` ("file" or "memory") database.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A connection setting such as `foreign_keys` was refused.
    Configure {
        setting: &'static str,
        source: rusqlite::Error,
    },
    /// `PRAGMA user_version` could not be read.
    VersionRead(rusqlite::Error),
    /// Migrating to `version` failed. The migration transaction was dropped,
    /// so the recorded version is unchanged.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Configure { .. } => "db_configure_failed",
            Self::VersionRead(_) => "db_version_read_failed",
            Self::Migration { .. } => "db_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "cannot open {mode} database: {source}"),
            Self::Configure { setting, source } => write!(f, "cannot set {setting}: {source}"),
            Self::VersionRead(source) => write!(f, "cannot read schema version: {source}"),
            Self::Migration { version, source } => {
                write!(f, "migration to schema version {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Configure { source, .. }
            | Self::Migration { source, .. }
            | Self::VersionRead(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
