//! Persistence layer for entities.
//!
//! # Responsibility
//! - Define the save contract consumed by deactivation actions.
//! - Isolate SQLite write details from model code.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`MissingRequiredTable`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod record_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for record persistence and query execution.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "required table is missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column is missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
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
