//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;
use sea_orm::RuntimeErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // Unique constraint violation, e.g. a second Call for the same
    // meet_code + call_date
    RecordAlreadyExists,
    // Validation error
    ValidationError,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Other errors
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

/// Postgres signals unique-index violations with SQLSTATE 23505; sqlx
/// surfaces that inside the runtime error string. This is the storage-level
/// guarantee the meet_code dedup invariant relies on.
fn is_unique_violation(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|dbe| dbe.code())
            .map(|code| code == "23505")
            .unwrap_or(false),
        RuntimeErr::Internal(msg) => msg.contains("23505"),
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotFound,
            },
            DbErr::RecordNotUpdated => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotUpdated,
            },
            DbErr::Query(ref runtime_err) if is_unique_violation(runtime_err) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordAlreadyExists,
            },
            DbErr::Exec(ref runtime_err) if is_unique_violation(runtime_err) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordAlreadyExists,
            },
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) | DbErr::Exec(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
            _ => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
        }
    }
}
