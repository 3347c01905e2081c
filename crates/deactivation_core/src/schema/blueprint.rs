//! Table blueprint with deactivation column shorthands.

use super::SchemaError;
use crate::model::deactivatable::DEFAULT_DEACTIVATED_AT_COLUMN;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// One declared change to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// Nullable temporal column; `NULL` means the row is active.
    AddNullableTimestamp { column: String },
    /// Column removal, including the index created by `IndexColumn`.
    DropColumn { column: String },
    IndexColumn { column: String },
}

/// Ordered list of changes against a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    table: String,
    changes: Vec<ColumnChange>,
}

impl Blueprint {
    /// Starts a blueprint for an existing table.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            changes: Vec::new(),
        }
    }

    /// Declares the `deactivated_at` column.
    pub fn add_deactivation_column(self) -> Self {
        self.add_deactivation_column_named(DEFAULT_DEACTIVATED_AT_COLUMN)
    }

    /// Declares a nullable temporal deactivation column named `column`.
    pub fn add_deactivation_column_named(mut self, column: impl Into<String>) -> Self {
        self.changes.push(ColumnChange::AddNullableTimestamp {
            column: column.into(),
        });
        self
    }

    /// Declares removal of the `deactivated_at` column.
    pub fn drop_deactivation_column(self) -> Self {
        self.drop_deactivation_column_named(DEFAULT_DEACTIVATED_AT_COLUMN)
    }

    pub fn drop_deactivation_column_named(mut self, column: impl Into<String>) -> Self {
        self.changes.push(ColumnChange::DropColumn {
            column: column.into(),
        });
        self
    }

    /// Declares an index on the `deactivated_at` column.
    pub fn index_deactivation_column(self) -> Self {
        self.index_deactivation_column_named(DEFAULT_DEACTIVATED_AT_COLUMN)
    }

    pub fn index_deactivation_column_named(mut self, column: impl Into<String>) -> Self {
        self.changes.push(ColumnChange::IndexColumn {
            column: column.into(),
        });
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn changes(&self) -> &[ColumnChange] {
        &self.changes
    }

    /// Renders the declared changes to SQLite statements, in declaration order.
    ///
    /// # Errors
    /// - Returns `SchemaError::InvalidIdentifier` for a malformed table or
    ///   column name. Nothing is rendered in that case.
    pub fn to_sql(&self) -> Result<Vec<String>, SchemaError> {
        let table = validate_identifier(&self.table)?;
        let mut statements = Vec::with_capacity(self.changes.len());

        for change in &self.changes {
            match change {
                ColumnChange::AddNullableTimestamp { column } => {
                    let column = validate_identifier(column)?;
                    statements.push(format!(
                        "ALTER TABLE \"{table}\" ADD COLUMN \"{column}\" DATETIME;"
                    ));
                }
                ColumnChange::DropColumn { column } => {
                    let column = validate_identifier(column)?;
                    // SQLite refuses to drop an indexed column.
                    statements.push(format!(
                        "DROP INDEX IF EXISTS \"{}\";",
                        index_name(table, column)
                    ));
                    statements.push(format!("ALTER TABLE \"{table}\" DROP COLUMN \"{column}\";"));
                }
                ColumnChange::IndexColumn { column } => {
                    let column = validate_identifier(column)?;
                    statements.push(format!(
                        "CREATE INDEX IF NOT EXISTS \"{}\" ON \"{table}\" (\"{column}\");",
                        index_name(table, column)
                    ));
                }
            }
        }

        Ok(statements)
    }
}

fn index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_index")
}

fn validate_identifier(value: &str) -> Result<&str, SchemaError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(value)
    } else {
        Err(SchemaError::InvalidIdentifier(value.to_string()))
    }
}
