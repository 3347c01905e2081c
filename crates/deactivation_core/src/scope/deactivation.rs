//! Deactivation global scope and its query modifiers.
//!
//! # Invariants
//! - Default queries emit `table.deactivated_at IS NULL`.
//! - Every modifier first clears the scope's slot, so the last one wins.

use crate::model::deactivatable::Deactivatable;
use crate::query::{Predicate, Select};
use crate::scope::{GlobalScope, Scopes};

/// Name under which the deactivation scope is registered.
pub const DEACTIVATION_SCOPE: &str = "deactivation";

/// Hides rows whose deactivation column is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeactivationScope;

impl<E: Deactivatable> GlobalScope<E> for DeactivationScope {
    fn name(&self) -> &'static str {
        DEACTIVATION_SCOPE
    }

    fn apply(&self) -> Predicate {
        Predicate::is_null(E::qualified_deactivated_at_column())
    }
}

/// Boot helper for deactivation-aware entities; call from `Entity::boot`.
pub fn boot_deactivation<E: Deactivatable>(scopes: &mut Scopes<E>) {
    scopes.add(DeactivationScope);
}

/// Opt-in/opt-out modifiers for the deactivation scope.
pub trait DeactivationQueryExt: Sized {
    /// Includes deactivated rows.
    fn with_deactivated(self) -> Self {
        self.with_deactivated_if(true)
    }

    /// `true` includes deactivated rows; `false` is `without_deactivated()`.
    fn with_deactivated_if(self, with_deactivated: bool) -> Self;

    /// Restores the active-only filter, even after `with_deactivated()`.
    fn without_deactivated(self) -> Self;

    /// Keeps only deactivated rows.
    fn only_deactivated(self) -> Self;
}

impl<E: Deactivatable> DeactivationQueryExt for Select<E> {
    fn with_deactivated_if(self, with_deactivated: bool) -> Self {
        if !with_deactivated {
            return self.without_deactivated();
        }
        self.without_global_scope(DEACTIVATION_SCOPE)
    }

    fn without_deactivated(self) -> Self {
        self.replace_global_scope(
            DEACTIVATION_SCOPE,
            Predicate::is_null(E::qualified_deactivated_at_column()),
        )
    }

    fn only_deactivated(self) -> Self {
        self.replace_global_scope(
            DEACTIVATION_SCOPE,
            Predicate::is_not_null(E::qualified_deactivated_at_column()),
        )
    }
}
