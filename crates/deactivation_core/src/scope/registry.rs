//! Per-type scope boot registry.
//!
//! # Responsibility
//! - Run `Entity::boot` exactly once per entity type for this registry.
//! - Build queries that carry the booted global scopes.
//!
//! # Invariants
//! - Boot is once-only even under concurrent first use from many threads.
//! - Registries are independent; nothing is registered process-wide.

use crate::model::entity::Entity;
use crate::query::Select;
use crate::scope::Scopes;
use log::info;
use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type BootCell = Arc<OnceCell<Arc<dyn Any + Send + Sync>>>;

/// Holds the booted global scopes of every entity type it has seen.
#[derive(Default)]
pub struct ScopeRegistry {
    booted: RwLock<HashMap<TypeId, BootCell>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scopes of `E`, booting the type on first use.
    pub fn scopes<E: Entity>(&self) -> Arc<Scopes<E>> {
        let cell = self.boot_cell::<E>();
        let booted = cell.get_or_init(|| {
            let mut scopes = Scopes::<E>::new();
            E::boot(&mut scopes);
            info!(
                "event=scope_boot module=scope status=ok table={} scopes={}",
                E::TABLE,
                scopes.len()
            );
            Arc::new(scopes) as Arc<dyn Any + Send + Sync>
        });

        Arc::clone(booted)
            .downcast::<Scopes<E>>()
            .unwrap_or_else(|_| unreachable!("boot cell is keyed by TypeId of its entity"))
    }

    /// Starts a query for `E` with every booted global scope applied.
    pub fn query<E: Entity>(&self) -> Select<E> {
        Select::new(self.scopes::<E>())
    }

    pub fn is_booted<E: Entity>(&self) -> bool {
        let booted = self.booted.read().unwrap_or_else(PoisonError::into_inner);
        booted
            .get(&TypeId::of::<E>())
            .is_some_and(|cell| cell.get().is_some())
    }

    fn boot_cell<E: Entity>(&self) -> BootCell {
        let key = TypeId::of::<E>();
        if let Some(cell) = self
            .booted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(cell);
        }

        let mut booted = self.booted.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(booted.entry(key).or_default())
    }
}
