#![allow(dead_code)]

use chrono::{DateTime, Utc};
use deactivation_core::model::cast::datetime_to_sql;
use deactivation_core::{
    boot_deactivation, open_db_in_memory, Blueprint, Deactivatable, Entity, Migration,
    RecordStore, Scopes, SqliteRecordStore,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub team_id: Option<i64>,
    pub name: String,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            team_id: None,
            name: name.to_string(),
            deactivated_at: None,
        }
    }

    pub fn in_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";

    fn columns() -> &'static [&'static str] {
        &["id", "team_id", "name", "deactivated_at"]
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            self.team_id.map_or(Value::Null, Value::Integer),
            Value::Text(self.name.clone()),
            datetime_to_sql(self.deactivated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            team_id: row.get("team_id")?,
            name: row.get("name")?,
            deactivated_at: Self::read_deactivated_at(row)?,
        })
    }

    fn boot(scopes: &mut Scopes<Self>) {
        boot_deactivation(scopes);
    }
}

impl Deactivatable for User {
    fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    fn set_deactivated_at(&mut self, value: Option<DateTime<Utc>>) {
        self.deactivated_at = value;
    }
}

/// Team uses a custom deactivation column.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub disabled_at: Option<DateTime<Utc>>,
}

impl Team {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            disabled_at: None,
        }
    }
}

impl Entity for Team {
    const TABLE: &'static str = "teams";

    fn columns() -> &'static [&'static str] {
        &["id", "name", "disabled_at"]
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.name.clone()),
            datetime_to_sql(self.disabled_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            disabled_at: Self::read_deactivated_at(row)?,
        })
    }

    fn boot(scopes: &mut Scopes<Self>) {
        boot_deactivation(scopes);
    }
}

impl Deactivatable for Team {
    const DEACTIVATED_AT: Option<&'static str> = Some("disabled_at");

    fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.disabled_at
    }

    fn set_deactivated_at(&mut self, value: Option<DateTime<Utc>>) {
        self.disabled_at = value;
    }
}

pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1).sql(
            "CREATE TABLE teams (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                team_id INTEGER REFERENCES teams(id),
                name TEXT NOT NULL
            );",
        ),
        Migration::new(2)
            .blueprint(Blueprint::table("users").add_deactivation_column())
            .blueprint(
                Blueprint::table("teams")
                    .add_deactivation_column_named("disabled_at")
                    .index_deactivation_column_named("disabled_at"),
            ),
    ]
}

pub fn open_test_db() -> Connection {
    open_db_in_memory(&migrations()).unwrap()
}

pub fn seed<E: Entity>(conn: &Connection, entities: &[E]) {
    let store = SqliteRecordStore::new(conn);
    for entity in entities {
        assert!(store.save(entity).unwrap());
    }
}

pub fn sorted_ids(users: &[User]) -> Vec<i64> {
    let mut ids = users.iter().map(|user| user.id).collect::<Vec<_>>();
    ids.sort_unstable();
    ids
}
