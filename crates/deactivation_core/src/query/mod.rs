//! Query building and execution over entity tables.
//!
//! # Responsibility
//! - Render `SELECT`/`COUNT` statements with bound parameters.
//! - Apply booted global scopes unless a query removes or replaces them.
//! - Execute through rusqlite and map rows with `Entity::from_row`.
//!
//! # Invariants
//! - Values are always bound, never interpolated into SQL text.
//! - Column names are interpolated as given; a bad name fails at execution.

mod predicate;
mod select;

pub use predicate::Predicate;
pub use select::{Join, Order, Select};
