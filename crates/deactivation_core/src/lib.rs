//! Record deactivation for SQLite-backed entities.
//!
//! Deactivated rows keep living in their table with a `deactivated_at`
//! timestamp and are hidden from default queries.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod schema;
pub mod scope;

pub use db::migrations::{apply_migrations, Migration};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::cast::NullableTimestamp;
pub use model::deactivatable::{Deactivatable, DEFAULT_DEACTIVATED_AT_COLUMN};
pub use model::entity::Entity;
pub use query::{Order, Predicate, Select};
pub use repo::record_store::{RecordStore, SqliteRecordStore};
pub use repo::{RepoError, RepoResult};
pub use schema::{Blueprint, SchemaError};
pub use scope::{
    boot_deactivation, DeactivationQueryExt, DeactivationScope, GlobalScope, ScopeRegistry, Scopes,
};

/// Returns the crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
