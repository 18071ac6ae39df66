//! Repository error taxonomy shared by every entity repository.
//!
//! Lookup misses are not errors: `get_*` returns `Ok(None)`. Everything
//! else carries enough context (entity, step, id) to tell which statement
//! of a multi-statement operation failed.

use crate::db::DbError;
use crate::model::nota::UnstorableDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Child table of the invoice aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildTable {
    Servicos,
    Partes,
}

impl ChildTable {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Servicos => "servicos",
            Self::Partes => "partes",
        }
    }
}

/// Sub-operation that was running when a repository call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStep {
    /// Reading the entity's own row(s).
    HeaderRead,
    /// Inserting, updating or deleting the entity's own row.
    HeaderWrite,
    ChildRead(ChildTable),
    ChildWrite(ChildTable),
    DateParse,
    /// Rendering a date for storage, before any statement runs.
    DateFormat,
    /// Opening or committing the surrounding transaction.
    Transaction,
}

impl Display for RepoStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeaderRead => write!(f, "header read"),
            Self::HeaderWrite => write!(f, "header write"),
            Self::ChildRead(table) => write!(f, "{} read", table.as_str()),
            Self::ChildWrite(table) => write!(f, "{} write", table.as_str()),
            Self::DateParse => write!(f, "date parse"),
            Self::DateFormat => write!(f, "date format"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    /// SQLite failure with the step and entity id it happened on.
    Storage {
        entity: &'static str,
        step: RepoStep,
        id: Option<String>,
        source: rusqlite::Error,
    },
    /// A stored value could not be decoded into its structured form.
    Decoding {
        entity: &'static str,
        id: String,
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },
    /// A value cannot be stored in a form that reads back unchanged.
    Encoding {
        entity: &'static str,
        id: String,
        field: &'static str,
        value: String,
        source: UnstorableDate,
    },
    /// Update targeted a row that does not exist.
    NotFound { entity: &'static str, id: String },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// In-memory repository lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    Db(DbError),
}

impl RepoError {
    pub(crate) fn storage(
        entity: &'static str,
        step: RepoStep,
        id: Option<&str>,
    ) -> impl FnOnce(rusqlite::Error) -> Self {
        let id = id.map(str::to_string);
        move |source| Self::Storage {
            entity,
            step,
            id,
            source,
        }
    }

    /// Step that failed, when the error came from a storage statement.
    pub fn step(&self) -> Option<RepoStep> {
        match self {
            Self::Storage { step, .. } => Some(*step),
            Self::Decoding { .. } => Some(RepoStep::DateParse),
            Self::Encoding { .. } => Some(RepoStep::DateFormat),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage {
                entity,
                step,
                id: Some(id),
                source,
            } => write!(f, "{entity} {step} failed for id {id}: {source}"),
            Self::Storage {
                entity,
                step,
                id: None,
                source,
            } => write!(f, "{entity} {step} failed: {source}"),
            Self::Decoding {
                entity,
                id,
                field,
                value,
                source,
            } => write!(
                f,
                "invalid persisted {entity} data: `{value}` in {field} for id {id}: {source}"
            ),
            Self::Encoding {
                entity,
                id,
                field,
                value,
                source,
            } => write!(
                f,
                "cannot store {entity} {field} `{value}` for id {id}: {source}"
            ),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::LockPoisoned(entity) => write!(f, "{entity} store lock poisoned"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::Decoding { source, .. } => Some(source),
            Self::Encoding { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::LockPoisoned(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}
