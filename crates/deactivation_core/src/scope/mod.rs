//! Global query scopes.
//!
//! # Responsibility
//! - Define named predicates applied to every query of an entity type.
//! - Boot each entity type once per registry and hand out scoped queries.
//!
//! # Invariants
//! - Scope names are unique per entity type; re-adding a name is a no-op.
//! - A scope only ever contributes its own predicate, so removing it from
//!   one query never affects other scopes.

use crate::model::entity::Entity;
use crate::query::Predicate;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

mod deactivation;
mod registry;

pub use deactivation::{
    boot_deactivation, DeactivationQueryExt, DeactivationScope, DEACTIVATION_SCOPE,
};
pub use registry::ScopeRegistry;

/// Predicate applied to every query of `E` unless removed per query.
pub trait GlobalScope<E: Entity>: Send + Sync {
    /// Stable name used to remove or replace the scope within a query.
    fn name(&self) -> &'static str;

    /// Predicate contributed by the scope.
    fn apply(&self) -> Predicate;
}

/// Global scopes registered for one entity type, in registration order.
pub struct Scopes<E: Entity> {
    entries: Vec<Arc<dyn GlobalScope<E>>>,
}

impl<E: Entity> Scopes<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `scope`. Returns `false` when its name is already taken.
    pub fn add<S>(&mut self, scope: S) -> bool
    where
        S: GlobalScope<E> + 'static,
    {
        if self.contains(scope.name()) {
            return false;
        }
        self.entries.push(Arc::new(scope));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|scope| scope.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|scope| scope.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn GlobalScope<E>>> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Entity> Default for Scopes<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Debug for Scopes<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
