//! Reconciliation use-case service.
//!
//! # Responsibility
//! - Own one category snapshot together with the store it was loaded from.
//! - Route compare/copy through the generic reconcile functions.
//!
//! # Invariants
//! - The snapshot is only mutated by `copy`, which writes the store first.
//! - `reload` is the only way to pick up rows written by other processes.

use crate::model::category::{Category, HostName, JumpPoints, Keybindings, Settings};
use crate::reconcile::compare::{compare, CategoryComparison};
use crate::reconcile::copy::{copy, CopyOutcome};
use crate::reconcile::snapshot::{load, Snapshot};
use crate::reconcile::ReconcileResult;
use crate::repo::config_repo::{ConfigStore, SqliteConfigStore};

/// Service facade for one configuration category.
pub struct ReconcileService<C: Category, S: ConfigStore<C>> {
    store: S,
    snapshot: Snapshot<C>,
}

/// Settings entry point over SQLite.
pub type SettingsService<'conn> = ReconcileService<Settings, SqliteConfigStore<'conn>>;
/// Keybindings entry point over SQLite.
pub type KeybindingsService<'conn> = ReconcileService<Keybindings, SqliteConfigStore<'conn>>;
/// Jump points entry point over SQLite.
pub type JumpPointsService<'conn> = ReconcileService<JumpPoints, SqliteConfigStore<'conn>>;

impl<C: Category, S: ConfigStore<C>> ReconcileService<C, S> {
    /// Loads the category snapshot from `store`.
    pub fn load(store: S) -> ReconcileResult<Self> {
        let snapshot = load(&store)?;
        Ok(Self {
            store,
            snapshot,
        })
    }

    /// Discovered hosts in universe order.
    pub fn hosts(&self) -> &[HostName] {
        self.snapshot.hosts()
    }

    /// Discovered slots in universe order.
    pub fn slots(&self) -> &[C::Slot] {
        self.snapshot.slots()
    }

    /// Current in-memory value for `(host, slot)`.
    pub fn value(&self, host: &str, slot: &C::Slot) -> Option<&C::Value> {
        self.snapshot.value(host, slot)
    }

    pub fn snapshot(&self) -> &Snapshot<C> {
        &self.snapshot
    }

    /// Classifies slots between `host1` and `host2`.
    pub fn compare(&self, host1: &str, host2: &str) -> ReconcileResult<CategoryComparison<C>> {
        compare(&self.snapshot, host1, host2)
    }

    /// Copies `slots` from `from_host` to `to_host`, skipping equal values.
    ///
    /// Not atomic: on error, slots before the failing one stay copied.
    pub fn copy(
        &mut self,
        from_host: &str,
        to_host: &str,
        slots: &[C::Slot],
    ) -> ReconcileResult<CopyOutcome<C::Slot>> {
        copy(&mut self.snapshot, &self.store, from_host, to_host, slots)
    }

    /// Rebuilds the snapshot from the store, refreshing both universes.
    pub fn reload(&mut self) -> ReconcileResult<()> {
        self.snapshot = load(&self.store)?;
        Ok(())
    }
}
