mod access;
mod library;
mod logistics;
mod ordering;
mod schedule;
mod trips;
mod users;

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{ffi, params, Connection, OptionalExtension, Params, Row};

use super::{RepoResult, RepositoryError};
use crate::access::Scope;
use crate::state::DbPool;

/// SQLite implementation
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepoResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

fn query_one<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: RowMapper<T>,
) -> RepoResult<Option<T>> {
    Ok(conn.query_row(sql, params, map).optional()?)
}

fn query_all<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: RowMapper<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Like `query_one`, but a missing row is an error.
fn fetch<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: RowMapper<T>,
    resource: &'static str,
) -> RepoResult<T> {
    query_one(conn, sql, params, map)?.ok_or(RepositoryError::NotFound(resource))
}

/// Position for a new member appended to a scope.
fn next_position(
    conn: &Connection,
    table: &str,
    parent_column: &str,
    parent_id: i64,
) -> rusqlite::Result<i64> {
    conn.query_row(
        &format!("SELECT COALESCE(MAX(position), 0) + 1 FROM {table} WHERE {parent_column} = ?1"),
        [parent_id],
        |row| row.get(0),
    )
}

/// Trip that owns a record, read on an already open connection.
fn trip_of(conn: &Connection, scope: Scope, id: i64) -> RepoResult<Option<i64>> {
    query_one(conn, access::owning_trip_sql(scope), params![id], |row| {
        row.get(0)
    })
}

/// Like `trip_of`, but a missing record is an error.
fn trip_of_existing(conn: &Connection, scope: Scope, id: i64) -> RepoResult<i64> {
    trip_of(conn, scope, id)?.ok_or(RepositoryError::NotFound(scope.resource()))
}

/// Rejects ids that name records of another trip.
fn ensure_in_trip(
    conn: &Connection,
    trip_id: i64,
    scope: Scope,
    ids: impl IntoIterator<Item = i64>,
) -> RepoResult<()> {
    for id in ids {
        match trip_of(conn, scope, id)? {
            Some(owner) if owner == trip_id => {}
            Some(_) => {
                return Err(RepositoryError::Invalid(format!(
                    "{} belongs to a different trip",
                    scope.resource().to_lowercase()
                )))
            }
            None => {
                return Err(RepositoryError::Invalid(
                    "referenced record does not exist".into(),
                ))
            }
        }
    }
    Ok(())
}

fn ensure_changed(rows: usize, resource: &'static str) -> RepoResult<()> {
    if rows == 0 {
        return Err(RepositoryError::NotFound(resource));
    }
    Ok(())
}

/// Maps unique and foreign-key violations to caller-facing errors.
fn constraint_error(err: rusqlite::Error, conflict: impl FnOnce() -> String) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return RepositoryError::Conflict(conflict());
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return RepositoryError::Invalid("referenced record does not exist".into());
            }
            _ => {}
        }
    }
    RepositoryError::Sql(err)
}
