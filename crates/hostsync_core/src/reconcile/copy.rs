//! Selective value copy between hosts.
//!
//! # Invariants
//! - Slots are processed in caller order; the first failure stops the batch.
//! - A slot whose destination already equals the source is never written.
//! - The snapshot cell changes only after the store upsert succeeds.

use super::snapshot::Snapshot;
use super::{ReconcileError, ReconcileResult};
use crate::model::category::Category;
use crate::model::record::ConfigRecord;
use crate::repo::config_repo::ConfigStore;
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

/// Per-slot result of a successful copy batch, in caller order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyOutcome<S> {
    /// Slots upserted into the destination host.
    pub copied: Vec<S>,
    /// Slots skipped because the destination already held the source value.
    pub unchanged: Vec<S>,
}

impl<S> CopyOutcome<S> {
    /// True when the batch wrote nothing.
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty()
    }
}

/// Copies `from_host`'s value for each slot into `to_host`.
///
/// For categories with `PRESERVES_EXTRA`, the source row is read back from
/// the store so its extra columns (descriptions) travel with the value.
///
/// # Errors
/// - `HostNotFound` when either host is outside the universe.
/// - `SlotNotFound` / `MissingSource` for the first offending slot.
/// - `DependentReadFailure` when the source row has vanished from the store.
/// - `Repo` for store failures.
///
/// Slots processed before a failure remain copied in both store and snapshot.
pub fn copy<C, S>(
    snapshot: &mut Snapshot<C>,
    store: &S,
    from_host: &str,
    to_host: &str,
    slots: &[C::Slot],
) -> ReconcileResult<CopyOutcome<C::Slot>>
where
    C: Category,
    S: ConfigStore<C> + ?Sized,
{
    let started_at = Instant::now();
    let mut outcome = CopyOutcome {
        copied: Vec::new(),
        unchanged: Vec::new(),
    };

    match copy_slots(snapshot, store, from_host, to_host, slots, &mut outcome) {
        Ok(()) => {
            info!(
                "event=copy_batch module=reconcile status=ok category={} from_host={} to_host={} requested={} copied={} unchanged={} duration_ms={}",
                C::NAME,
                from_host,
                to_host,
                slots.len(),
                outcome.copied.len(),
                outcome.unchanged.len(),
                started_at.elapsed().as_millis()
            );
            Ok(outcome)
        }
        Err(err) => {
            error!(
                "event=copy_batch module=reconcile status=error category={} from_host={} to_host={} requested={} copied={} duration_ms={} error_code={} error={}",
                C::NAME,
                from_host,
                to_host,
                slots.len(),
                outcome.copied.len(),
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn copy_slots<C, S>(
    snapshot: &mut Snapshot<C>,
    store: &S,
    from_host: &str,
    to_host: &str,
    slots: &[C::Slot],
    outcome: &mut CopyOutcome<C::Slot>,
) -> ReconcileResult<()>
where
    C: Category,
    S: ConfigStore<C> + ?Sized,
{
    let from = snapshot.require_host(from_host)?;
    let to = snapshot.require_host(to_host)?;

    for slot in slots {
        let index = snapshot.require_slot(slot)?;
        let source = snapshot
            .cell(from, index)
            .cloned()
            .ok_or_else(|| ReconcileError::MissingSource(slot.to_string()))?;

        if snapshot.cell(to, index) == Some(&source) {
            outcome.unchanged.push(slot.clone());
            continue;
        }

        let extra = if C::PRESERVES_EXTRA {
            store
                .find_record(from_host, slot)?
                .ok_or_else(|| ReconcileError::DependentReadFailure {
                    host: from_host.to_string(),
                    slot: slot.to_string(),
                })?
                .extra
        } else {
            C::Extra::default()
        };

        store.upsert_record(&ConfigRecord::new(
            to_host,
            slot.clone(),
            source.clone(),
            extra,
        ))?;
        snapshot.set_cell(to, index, source);

        info!(
            "event=slot_copy module=reconcile status=ok category={} from_host={} to_host={} slot={}",
            C::NAME,
            from_host,
            to_host,
            slot
        );
        outcome.copied.push(slot.clone());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::copy;
    use crate::model::category::{HostName, JumpPoints};
    use crate::model::record::ConfigRecord;
    use crate::model::value::KeyList;
    use crate::reconcile::snapshot::{load, Snapshot};
    use crate::reconcile::ReconcileError;
    use crate::repo::config_repo::{ConfigStore, RepoResult};
    use std::cell::RefCell;

    /// Vec-backed store that counts upserts.
    #[derive(Default)]
    struct MemoryStore {
        records: RefCell<Vec<ConfigRecord<JumpPoints>>>,
        upserts: RefCell<usize>,
    }

    impl MemoryStore {
        fn with(records: Vec<ConfigRecord<JumpPoints>>) -> Self {
            Self {
                records: RefCell::new(records),
                upserts: RefCell::new(0),
            }
        }
    }

    impl ConfigStore<JumpPoints> for MemoryStore {
        fn distinct_hosts(&self) -> RepoResult<Vec<HostName>> {
            let mut hosts: Vec<HostName> =
                self.records.borrow().iter().map(|r| r.hostname.clone()).collect();
            hosts.sort();
            hosts.dedup();
            Ok(hosts)
        }

        fn distinct_slots(&self) -> RepoResult<Vec<String>> {
            let mut slots: Vec<String> =
                self.records.borrow().iter().map(|r| r.slot.clone()).collect();
            slots.sort();
            slots.dedup();
            Ok(slots)
        }

        fn list_records(&self) -> RepoResult<Vec<ConfigRecord<JumpPoints>>> {
            Ok(self.records.borrow().clone())
        }

        fn find_record(
            &self,
            hostname: &str,
            slot: &String,
        ) -> RepoResult<Option<ConfigRecord<JumpPoints>>> {
            Ok(self
                .records
                .borrow()
                .iter()
                .find(|r| r.hostname == hostname && &r.slot == slot)
                .cloned())
        }

        fn upsert_record(&self, record: &ConfigRecord<JumpPoints>) -> RepoResult<()> {
            *self.upserts.borrow_mut() += 1;
            let mut records = self.records.borrow_mut();
            match records
                .iter_mut()
                .find(|r| r.hostname == record.hostname && r.slot == record.slot)
            {
                Some(existing) => *existing = record.clone(),
                None => records.push(record.clone()),
            }
            Ok(())
        }
    }

    fn jump(host: &str, dest: &str, keys: &[&str], description: &str) -> ConfigRecord<JumpPoints> {
        ConfigRecord::new(
            host,
            dest.to_string(),
            KeyList::from_keys(keys.iter().copied()),
            Some(description.to_string()),
        )
    }

    fn seeded() -> (MemoryStore, Snapshot<JumpPoints>) {
        let store = MemoryStore::with(vec![
            jump("ned", "home", &["ctrl", "h"], "go home"),
            jump("ned", "mail", &["ctrl", "m"], "inbox"),
            jump("moe", "mail", &["ctrl", "m"], "moe inbox"),
            jump("moe", "work", &["ctrl", "w"], "office"),
        ]);
        let snapshot = load(&store).unwrap();
        (store, snapshot)
    }

    #[test]
    fn copy_carries_source_description_and_updates_snapshot() {
        let (store, mut snapshot) = seeded();

        let outcome = copy(&mut snapshot, &store, "ned", "moe", &["home".to_string()]).unwrap();

        assert_eq!(outcome.copied, vec!["home".to_string()]);
        assert_eq!(
            snapshot.value("moe", &"home".to_string()),
            Some(&KeyList::from_keys(["ctrl", "h"]))
        );
        let stored = store.find_record("moe", &"home".to_string()).unwrap().unwrap();
        assert_eq!(stored.extra.as_deref(), Some("go home"));
    }

    #[test]
    fn copy_skips_equal_values_without_writing() {
        let (store, mut snapshot) = seeded();

        let outcome = copy(&mut snapshot, &store, "ned", "moe", &["mail".to_string()]).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.unchanged, vec!["mail".to_string()]);
        assert_eq!(*store.upserts.borrow(), 0);
        let stored = store.find_record("moe", &"mail".to_string()).unwrap().unwrap();
        assert_eq!(stored.extra.as_deref(), Some("moe inbox"));
    }

    #[test]
    fn copy_stops_at_first_failing_slot_and_keeps_earlier_writes() {
        let (store, mut snapshot) = seeded();

        let err = copy(
            &mut snapshot,
            &store,
            "ned",
            "moe",
            &["home".to_string(), "work".to_string(), "mail".to_string()],
        )
        .unwrap_err();

        assert!(matches!(err, ReconcileError::MissingSource(slot) if slot == "work"));
        assert_eq!(*store.upserts.borrow(), 1);
        assert!(snapshot.value("moe", &"home".to_string()).is_some());
    }

    #[test]
    fn copy_reports_vanished_source_row() {
        let (store, mut snapshot) = seeded();
        store
            .records
            .borrow_mut()
            .retain(|r| !(r.hostname == "ned" && r.slot == "home"));

        let err = copy(&mut snapshot, &store, "ned", "moe", &["home".to_string()]).unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::DependentReadFailure { ref host, ref slot } if host == "ned" && slot == "home"
        ));
        assert_eq!(*store.upserts.borrow(), 0);
        assert_eq!(snapshot.value("moe", &"home".to_string()), None);
    }

    #[test]
    fn copy_rejects_unknown_hosts_and_slots() {
        let (store, mut snapshot) = seeded();

        let err = copy(&mut snapshot, &store, "ned", "bart", &[]).unwrap_err();
        assert!(matches!(err, ReconcileError::HostNotFound(host) if host == "bart"));

        let err = copy(&mut snapshot, &store, "ned", "moe", &["gym".to_string()]).unwrap_err();
        assert!(matches!(err, ReconcileError::SlotNotFound(slot) if slot == "gym"));
    }
}
