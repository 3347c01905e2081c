//! Record model contracts.
//!
//! # Responsibility
//! - Describe how a record type maps to one SQLite table.
//! - Attach deactivation semantics to record types through `Deactivatable`.
//!
//! # Invariants
//! - A deactivated record is never physically removed by this crate.
//! - `deactivated_at == None` is the only "active" state.

pub mod cast;
pub mod deactivatable;
pub mod entity;
