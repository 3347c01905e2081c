//! Entity mapping contract.
//!
//! An entity is one Rust type stored in one table. The query builder reads
//! `TABLE`/`columns()` to render SQL and `from_row` to map results; the record
//! store reads `to_values()` to persist.

use crate::scope::Scopes;
use rusqlite::types::Value;
use rusqlite::Row;

/// Record type persisted in a single SQLite table.
pub trait Entity: Sized + 'static {
    /// Storage table name.
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str = "id";

    /// Persisted columns, primary key included, in `to_values` order.
    fn columns() -> &'static [&'static str];

    /// Column values aligned with `columns()`.
    fn to_values(&self) -> Vec<Value>;

    /// Maps one selected row back to the entity.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Type-initialization hook, run once per type per `ScopeRegistry`.
    ///
    /// Register global scopes here.
    fn boot(_scopes: &mut Scopes<Self>) {}

    /// Prefixes `column` with the table name unless it is already qualified.
    fn qualify_column(column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{column}", Self::TABLE)
        }
    }
}
