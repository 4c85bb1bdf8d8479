//! Scoped persistence layer.
//!
//! # Responsibility
//! - Provide one repository contract + SQLite implementation per entity.
//! - Enforce ownership scoping inside every SQL statement.
//!
//! # Invariants
//! - A non-owned id behaves identically to a nonexistent id.
//! - `Scope::Anonymous` short-circuits at method entry: reads yield empty
//!   results, writes are denied.
//! - Write paths validate entities before SQL; read paths reject invalid
//!   persisted state instead of masking it.

use crate::db::DbError;
use crate::model::ValidationError;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod category_repo;
pub mod subtask_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all entity repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// A direct write targeted a row that is absent or not owned.
    NotFound(Uuid),
    /// Write attempted without an authenticated identity.
    AnonymousWrite,
    /// Entity owner does not match the repository scope.
    ScopeViolation,
    /// Persisted state failed to parse or validate.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::AnonymousWrite => write!(f, "write denied: no acting identity"),
            Self::ScopeViolation => write!(f, "entity owner does not match repository scope"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
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

pub(crate) fn parse_uuid(column: &str, value: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn to_epoch_ms(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_epoch_ms(column: &str, value: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

pub(crate) fn opt_from_epoch_ms(
    column: &str,
    value: Option<i64>,
) -> RepoResult<Option<DateTime<Utc>>> {
    value.map(|ms| from_epoch_ms(column, ms)).transpose()
}

pub(crate) fn bool_from_int(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

/// Builds a `%text%` LIKE pattern with `\`-escaped wildcards, lowercased
/// so `LOWER(column) LIKE ? ESCAPE '\'` matches case-insensitively.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
