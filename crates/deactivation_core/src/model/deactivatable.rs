//! Deactivation capability for entities.
//!
//! # Responsibility
//! - Read and write the nullable deactivation timestamp of one record.
//! - Expose the derived "is active" flag and activate/deactivate actions.
//!
//! # Invariants
//! - `is_active()` is true iff `deactivated_at()` is `None`.
//! - `activate`/`deactivate` persist through `RecordStore::save` and return
//!   its result unchanged, errors included.
//! - `set_active*` mutate in memory only.

use crate::model::cast::NullableTimestamp;
use crate::model::entity::Entity;
use crate::repo::record_store::RecordStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::Row;

/// Column name used when an entity does not override `DEACTIVATED_AT`.
pub const DEFAULT_DEACTIVATED_AT_COLUMN: &str = "deactivated_at";

/// Entity whose rows can be deactivated instead of deleted.
///
/// Implementors also register the deactivation scope from `Entity::boot`
/// via [`crate::scope::boot_deactivation`], so default queries hide
/// deactivated rows.
pub trait Deactivatable: Entity {
    /// Per-type override of the deactivation column name.
    const DEACTIVATED_AT: Option<&'static str> = None;

    fn deactivated_at(&self) -> Option<DateTime<Utc>>;

    fn set_deactivated_at(&mut self, value: Option<DateTime<Utc>>);

    fn deactivated_at_column() -> &'static str {
        Self::DEACTIVATED_AT.unwrap_or(DEFAULT_DEACTIVATED_AT_COLUMN)
    }

    /// `table.column` form, unambiguous in joined queries.
    fn qualified_deactivated_at_column() -> String {
        Self::qualify_column(Self::deactivated_at_column())
    }

    /// Reads the deactivation column from `row` as a temporal value.
    fn read_deactivated_at(row: &Row<'_>) -> rusqlite::Result<Option<DateTime<Utc>>> {
        let value: NullableTimestamp = row.get(Self::deactivated_at_column())?;
        Ok(value.into_inner())
    }

    fn is_active(&self) -> bool {
        self.deactivated_at().is_none()
    }

    /// `true` clears the timestamp; `false` stamps the current instant.
    fn set_active(&mut self, active: bool) {
        let value = if active { None } else { Some(Utc::now()) };
        self.set_deactivated_at(value);
    }

    /// Loosely-typed assignment of the active flag.
    ///
    /// Only a JSON `true` activates. Every other value deactivates, including
    /// `1`, `"1"` and `"true"`.
    fn set_active_value(&mut self, value: &serde_json::Value) {
        self.set_active(matches!(value, serde_json::Value::Bool(true)));
    }

    /// Clears the timestamp and saves the record.
    fn activate<S: RecordStore>(&mut self, store: &S) -> Result<bool, S::Error> {
        self.set_deactivated_at(None);
        persist_transition(&*self, store, "record_activate")
    }

    /// Stamps the current instant and saves the record.
    fn deactivate<S: RecordStore>(&mut self, store: &S) -> Result<bool, S::Error> {
        self.set_deactivated_at(Some(Utc::now()));
        persist_transition(&*self, store, "record_deactivate")
    }
}

fn persist_transition<E, S>(entity: &E, store: &S, event: &str) -> Result<bool, S::Error>
where
    E: Deactivatable,
    S: RecordStore,
{
    match store.save(entity) {
        Ok(saved) => {
            info!(
                "event={event} module=model status=ok table={} saved={saved}",
                E::TABLE
            );
            Ok(saved)
        }
        Err(err) => {
            warn!("event={event} module=model status=error table={}", E::TABLE);
            Err(err)
        }
    }
}
