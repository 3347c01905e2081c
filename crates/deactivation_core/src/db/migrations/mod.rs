//! Migration registry and executor.
//!
//! # Responsibility
//! - Describe schema migrations as raw SQL or `Blueprint` steps.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must be strictly increasing.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use crate::schema::Blueprint;
use log::{debug, info};
use rusqlite::Connection;

/// One step inside a migration.
#[derive(Debug, Clone)]
pub enum MigrationStep {
    Sql(String),
    Blueprint(Blueprint),
}

/// Versioned group of schema steps applied in one transaction with its peers.
#[derive(Debug, Clone)]
pub struct Migration {
    version: u32,
    steps: Vec<MigrationStep>,
}

impl Migration {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            steps: Vec::new(),
        }
    }

    /// Appends a raw SQL batch.
    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.steps.push(MigrationStep::Sql(sql.into()));
        self
    }

    /// Appends a blueprint whose DDL is rendered at apply time.
    pub fn blueprint(mut self, blueprint: Blueprint) -> Self {
        self.steps.push(MigrationStep::Blueprint(blueprint));
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Renders every step into executable SQL batches.
    ///
    /// # Errors
    /// - Returns `DbError::Schema` when a blueprint has invalid identifiers.
    pub fn statements(&self) -> DbResult<Vec<String>> {
        let mut statements = Vec::new();
        for step in &self.steps {
            match step {
                MigrationStep::Sql(sql) => statements.push(sql.clone()),
                MigrationStep::Blueprint(blueprint) => statements.extend(blueprint.to_sql()?),
            }
        }
        Ok(statements)
    }
}

/// Returns the latest version in `migrations`, or `0` when empty.
pub fn latest_version(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, Migration::version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    ensure_monotonic(migrations)?;

    let current_version = current_user_version(conn)?;
    let latest = latest_version(migrations);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        debug!("event=migrations_apply module=db status=skipped version={current_version}");
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations {
        if migration.version <= current_version {
            continue;
        }

        for statement in migration.statements()? {
            tx.execute_batch(&statement)?;
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=migrations_apply module=db status=ok from_version={current_version} to_version={latest}"
    );
    Ok(())
}

/// Reads the applied schema version of `conn`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn ensure_monotonic(migrations: &[Migration]) -> DbResult<()> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(DbError::NonMonotonicMigration {
                previous: pair[0].version,
                version: pair[1].version,
            });
        }
    }
    Ok(())
}
