//! SQLite connection bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for deactivation-aware records.
//! - Apply caller-provided schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Records must not be read or written before migrations succeed.

use crate::schema::SchemaError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Stored schema is newer than every migration this binary knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Migration list is not strictly increasing.
    NonMonotonicMigration { previous: u32, version: u32 },
    /// A blueprint step could not be rendered to DDL.
    Schema(SchemaError),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::NonMonotonicMigration { previous, version } => write!(
                f,
                "migration version {version} must be greater than previous version {previous}"
            ),
            Self::Schema(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::NonMonotonicMigration { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<SchemaError> for DbError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}
