//! `WHERE` predicates.

use rusqlite::types::Value;

/// Single condition in a `WHERE` clause. Conditions are joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsNull(String),
    IsNotNull(String),
    Eq(String, Value),
}

impl Predicate {
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Self::IsNull(column) | Self::IsNotNull(column) | Self::Eq(column, _) => column,
        }
    }

    /// Appends the SQL fragment to `sql` and its parameters to `binds`.
    pub(crate) fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::IsNull(column) => {
                sql.push_str(column);
                sql.push_str(" IS NULL");
            }
            Self::IsNotNull(column) => {
                sql.push_str(column);
                sql.push_str(" IS NOT NULL");
            }
            Self::Eq(column, value) => {
                binds.push(value.clone());
                sql.push_str(&format!("{column} = ?{}", binds.len()));
            }
        }
    }
}
