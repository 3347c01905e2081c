//! Record save contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist whole entities (insert or update by primary key).
//! - Check that a connection carries the table/columns an entity needs.
//!
//! # Invariants
//! - `save` writes every column in `Entity::columns()`.
//! - `save` reports whether a row was written; it never retries.

use crate::model::deactivatable::Deactivatable;
use crate::model::entity::Entity;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params_from_iter, Connection};

/// Save operation consumed by `Deactivatable::activate`/`deactivate`.
pub trait RecordStore {
    type Error;

    /// Persists `entity`; `Ok(true)` when a row was inserted or updated.
    fn save<E: Entity>(&self, entity: &E) -> Result<bool, Self::Error>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Verifies that the table and every mapped column of `E` exist.
    pub fn ensure_ready<E: Entity>(&self) -> RepoResult<()> {
        if !table_exists(self.conn, E::TABLE)? {
            return Err(RepoError::MissingRequiredTable(E::TABLE));
        }

        for &column in E::columns() {
            if !table_has_column(self.conn, E::TABLE, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: E::TABLE,
                    column,
                });
            }
        }

        Ok(())
    }

    /// Like `ensure_ready`, and also checks the deactivation column when it
    /// is not part of `Entity::columns()`.
    pub fn ensure_deactivation_ready<E: Deactivatable>(&self) -> RepoResult<()> {
        self.ensure_ready::<E>()?;

        let column = E::deactivated_at_column();
        if !table_has_column(self.conn, E::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    type Error = RepoError;

    fn save<E: Entity>(&self, entity: &E) -> RepoResult<bool> {
        let sql = upsert_sql::<E>();
        let values = entity.to_values();
        let changed = self.conn.execute(&sql, params_from_iter(values))?;

        debug!(
            "event=record_save module=repo status=ok table={} changed={changed}",
            E::TABLE
        );
        Ok(changed > 0)
    }
}

fn upsert_sql<E: Entity>() -> String {
    let columns = E::columns();
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let assignments = columns
        .iter()
        .filter(|column| **column != E::PRIMARY_KEY)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>();

    let conflict_action = if assignments.is_empty() {
        "NOTHING".to_string()
    } else {
        format!("UPDATE SET {}", assignments.join(", "))
    };

    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders})
         ON CONFLICT({primary_key}) DO {conflict_action};",
        table = E::TABLE,
        columns = columns.join(", "),
        primary_key = E::PRIMARY_KEY,
    )
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
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pragma_table_info(?1)
            WHERE name = ?2
        );",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{upsert_sql, RecordStore, SqliteRecordStore};
    use crate::model::entity::Entity;
    use crate::repo::RepoError;
    use rusqlite::types::Value;
    use rusqlite::{Connection, Row};

    #[derive(Debug, PartialEq)]
    struct Tag {
        id: i64,
        label: String,
    }

    impl Entity for Tag {
        const TABLE: &'static str = "tags";

        fn columns() -> &'static [&'static str] {
            &["id", "label"]
        }

        fn to_values(&self) -> Vec<Value> {
            vec![Value::Integer(self.id), Value::Text(self.label.clone())]
        }

        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self {
                id: row.get("id")?,
                label: row.get("label")?,
            })
        }
    }

    #[test]
    fn upsert_updates_every_non_key_column() {
        let sql = upsert_sql::<Tag>();
        assert!(sql.starts_with("INSERT INTO tags (id, label) VALUES (?1, ?2)"));
        assert!(sql.contains("ON CONFLICT(id) DO UPDATE SET label = excluded.label;"));
    }

    #[test]
    fn save_inserts_then_updates_in_place() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE tags (id INTEGER PRIMARY KEY, label TEXT NOT NULL);")
            .unwrap();
        let store = SqliteRecordStore::new(&conn);

        assert!(store.save(&Tag { id: 1, label: "a".to_string() }).unwrap());
        assert!(store.save(&Tag { id: 1, label: "b".to_string() }).unwrap());

        let (count, label): (i64, String) = conn
            .query_row("SELECT COUNT(*), MAX(label) FROM tags;", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(label, "b");
    }

    #[test]
    fn ensure_ready_reports_missing_table_and_column() {
        let conn = Connection::open_in_memory().unwrap();
        let store = SqliteRecordStore::new(&conn);

        assert!(matches!(
            store.ensure_ready::<Tag>(),
            Err(RepoError::MissingRequiredTable("tags"))
        ));

        conn.execute_batch("CREATE TABLE tags (id INTEGER PRIMARY KEY);")
            .unwrap();
        assert!(matches!(
            store.ensure_ready::<Tag>(),
            Err(RepoError::MissingRequiredColumn {
                table: "tags",
                column: "label"
            })
        ));
    }
}
