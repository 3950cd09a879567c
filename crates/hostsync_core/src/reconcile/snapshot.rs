//! Dense in-memory mapping of one category.
//!
//! # Responsibility
//! - Discover host and slot universes from the store.
//! - Hold exactly one cell per `(host, slot)` pair: a value or absence.
//!
//! # Invariants
//! - `hosts` and `slots` keep store discovery order and never grow.
//! - `cells.len() == hosts.len() * slots.len()`.

use super::{ReconcileError, ReconcileResult};
use crate::model::category::{Category, HostName};
use crate::repo::config_repo::{ConfigStore, RepoError};
use log::{error, info};
use std::collections::HashMap;
use std::time::Instant;

/// Loaded `host -> slot -> value-or-absent` mapping for category `C`.
#[derive(Debug, Clone)]
pub struct Snapshot<C: Category> {
    hosts: Vec<HostName>,
    slots: Vec<C::Slot>,
    host_index: HashMap<HostName, usize>,
    slot_index: HashMap<C::Slot, usize>,
    cells: Vec<Option<C::Value>>,
}

impl<C: Category> Snapshot<C> {
    /// Builds an all-absent snapshot over the given universes.
    ///
    /// Duplicate entries keep their first position.
    pub fn empty(hosts: Vec<HostName>, slots: Vec<C::Slot>) -> Self {
        let mut host_index = HashMap::with_capacity(hosts.len());
        let mut unique_hosts = Vec::with_capacity(hosts.len());
        for host in hosts {
            if !host_index.contains_key(&host) {
                host_index.insert(host.clone(), unique_hosts.len());
                unique_hosts.push(host);
            }
        }

        let mut slot_index = HashMap::with_capacity(slots.len());
        let mut unique_slots = Vec::with_capacity(slots.len());
        for slot in slots {
            if !slot_index.contains_key(&slot) {
                slot_index.insert(slot.clone(), unique_slots.len());
                unique_slots.push(slot);
            }
        }

        let cells = vec![None; unique_hosts.len() * unique_slots.len()];
        Self {
            hosts: unique_hosts,
            slots: unique_slots,
            host_index,
            slot_index,
            cells,
        }
    }

    /// Hosts in discovery order.
    pub fn hosts(&self) -> &[HostName] {
        &self.hosts
    }

    /// Slots in discovery order.
    pub fn slots(&self) -> &[C::Slot] {
        &self.slots
    }

    /// Returns the host's value for the slot, `None` when absent or when
    /// either key is outside the universe.
    pub fn value(&self, host: &str, slot: &C::Slot) -> Option<&C::Value> {
        let host = *self.host_index.get(host)?;
        let slot = *self.slot_index.get(slot)?;
        self.cell(host, slot)
    }

    /// Number of present cells.
    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub(crate) fn require_host(&self, host: &str) -> ReconcileResult<usize> {
        self.host_index
            .get(host)
            .copied()
            .ok_or_else(|| ReconcileError::HostNotFound(host.to_string()))
    }

    pub(crate) fn require_slot(&self, slot: &C::Slot) -> ReconcileResult<usize> {
        self.slot_index
            .get(slot)
            .copied()
            .ok_or_else(|| ReconcileError::SlotNotFound(slot.to_string()))
    }

    pub(crate) fn cell(&self, host: usize, slot: usize) -> Option<&C::Value> {
        self.cells[self.offset(host, slot)].as_ref()
    }

    pub(crate) fn set_cell(&mut self, host: usize, slot: usize, value: C::Value) {
        let offset = self.offset(host, slot);
        self.cells[offset] = Some(value);
    }

    fn offset(&self, host: usize, slot: usize) -> usize {
        host * self.slots.len() + slot
    }
}

/// Loads every row of category `C` into a fresh snapshot.
///
/// # Errors
/// - Store failures propagate as `ReconcileError::Repo`.
/// - A row whose host or slot is missing from the distinct queries (a write
///   raced the load) is reported as invalid data.
///
/// # Side effects
/// - Reads only. Emits a `snapshot_load` event.
pub fn load<C, S>(store: &S) -> ReconcileResult<Snapshot<C>>
where
    C: Category,
    S: ConfigStore<C> + ?Sized,
{
    let started_at = Instant::now();
    match load_inner(store) {
        Ok(snapshot) => {
            info!(
                "event=snapshot_load module=reconcile status=ok category={} hosts={} slots={} present={} duration_ms={}",
                C::NAME,
                snapshot.hosts.len(),
                snapshot.slots.len(),
                snapshot.present_count(),
                started_at.elapsed().as_millis()
            );
            Ok(snapshot)
        }
        Err(err) => {
            error!(
                "event=snapshot_load module=reconcile status=error category={} duration_ms={} error_code={} error={}",
                C::NAME,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn load_inner<C, S>(store: &S) -> ReconcileResult<Snapshot<C>>
where
    C: Category,
    S: ConfigStore<C> + ?Sized,
{
    let mut snapshot = Snapshot::empty(store.distinct_hosts()?, store.distinct_slots()?);

    for record in store.list_records()? {
        let (Some(&host), Some(&slot)) = (
            snapshot.host_index.get(&record.hostname),
            snapshot.slot_index.get(&record.slot),
        ) else {
            return Err(RepoError::InvalidData(format!(
                "{} row for host `{}` slot `{}` appeared after universe discovery",
                C::NAME,
                record.hostname,
                record.slot
            ))
            .into());
        };
        snapshot.set_cell(host, slot, record.value);
    }

    Ok(snapshot)
}
