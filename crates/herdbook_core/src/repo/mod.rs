//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//! - Render resolved filter plans into parameterized SQL.
//!
//! # Invariants
//! - Every owner-scoped read/write constrains `owner_id`.
//! - Unique-constraint failures surface as `RepoError::UniqueViolation`,
//!   not as raw SQLite errors.

pub mod cow_repo;
pub mod owner_repo;
pub mod record_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::filter::{Condition, FilterPlan, FilterValue};
use crate::model::DATE_FORMAT;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    /// A write hit a UNIQUE constraint on `table`.
    UniqueViolation {
        table: &'static str,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UniqueViolation { table } => {
                write!(f, "unique constraint violated on `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a write failure, turning UNIQUE violations into `UniqueViolation`.
pub(crate) fn classify_write_error(err: rusqlite::Error, table: &'static str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::UniqueViolation { table }
        }
        _ => err.into(),
    }
}

/// Appends ` AND <predicate>` for every plan predicate.
pub(crate) fn push_plan_predicates(sql: &mut String, bind_values: &mut Vec<Value>, plan: &FilterPlan) {
    for predicate in &plan.predicates {
        let column = predicate.field.column;
        match &predicate.condition {
            Condition::Equals(value) => {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(filter_value_to_db(value));
            }
            Condition::IsNull(true) => sql.push_str(&format!(" AND {column} IS NULL")),
            Condition::IsNull(false) => sql.push_str(&format!(" AND {column} IS NOT NULL")),
        }
    }
}

/// Appends the ORDER BY clause: requested ordering or schema default, then
/// the tiebreak column.
pub(crate) fn push_plan_ordering(sql: &mut String, plan: &FilterPlan) {
    let mut terms: Vec<String> = match plan.ordering {
        Some(ordering) => vec![format!(
            "{} {}",
            ordering.field.column,
            direction(ordering.descending)
        )],
        None => plan
            .schema
            .default_order
            .iter()
            .map(|term| format!("{} {}", term.column, direction(term.descending)))
            .collect(),
    };
    terms.push(format!("{} ASC", plan.schema.tiebreak_column));
    sql.push_str(" ORDER BY ");
    sql.push_str(&terms.join(", "));
}

fn direction(descending: bool) -> &'static str {
    if descending {
        "DESC"
    } else {
        "ASC"
    }
}

fn filter_value_to_db(value: &FilterValue) -> Value {
    match value {
        FilterValue::Integer(value) => Value::Integer(*value),
        FilterValue::Text(value) => Value::Text(value.clone()),
        FilterValue::Boolean(value) => Value::Integer(bool_to_int(*value)),
        FilterValue::Date(value) => Value::Text(value.format(DATE_FORMAT).to_string()),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Verifies `conn` is migrated and carries `table` with `columns`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
