//! Connection readiness checks run by repository constructors.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::error::{RepoError, RepoResult, RepoStep};
use rusqlite::Connection;

/// Rejects connections that were not opened through [`crate::db::open_db`]
/// or that lack one of `tables`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .map_err(RepoError::storage("schema", RepoStep::HeaderRead, None))?;
    Ok(exists == 1)
}
