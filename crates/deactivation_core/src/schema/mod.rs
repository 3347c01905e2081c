//! Schema-definition helpers for deactivation columns.
//!
//! # Responsibility
//! - Declare add/drop of the nullable deactivation timestamp column.
//! - Render declarations to SQLite DDL for the migration runner.
//!
//! # Invariants
//! - Helpers never touch a connection; they only describe changes.
//! - Every rendered identifier matches `[A-Za-z_][A-Za-z0-9_]*`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod blueprint;

pub use blueprint::{Blueprint, ColumnChange};

/// Errors raised while rendering schema declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Table or column name cannot be used as a bare SQL identifier.
    InvalidIdentifier(String),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "invalid schema identifier `{value}`"),
        }
    }
}

impl Error for SchemaError {}
