//! Two-host slot classification.

use super::snapshot::Snapshot;
use super::ReconcileResult;
use crate::model::category::Category;
use serde::Serialize;

/// A slot paired with one host's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotValue<S, V> {
    pub slot: S,
    pub value: V,
}

/// A slot whose value differs between the two compared hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotDifference<S, V> {
    pub slot: S,
    pub host1_value: V,
    pub host2_value: V,
}

/// Classification of every slot present on at least one of two hosts.
///
/// Each list keeps slot universe order and a slot lands in at most one list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison<S, V> {
    pub only_host1: Vec<SlotValue<S, V>>,
    pub only_host2: Vec<SlotValue<S, V>>,
    pub matching: Vec<SlotValue<S, V>>,
    pub different: Vec<SlotDifference<S, V>>,
}

/// Comparison result for category `C`.
pub type CategoryComparison<C> = Comparison<<C as Category>::Slot, <C as Category>::Value>;

impl<S: Clone, V> Comparison<S, V> {
    /// Slots of `different`, ready to feed into copy.
    pub fn different_slots(&self) -> Vec<S> {
        self.different.iter().map(|entry| entry.slot.clone()).collect()
    }

    /// Slots of `only_host1`, ready to feed into copy.
    pub fn only_host1_slots(&self) -> Vec<S> {
        self.only_host1
            .iter()
            .map(|entry| entry.slot.clone())
            .collect()
    }

    /// True when neither host has a value the other lacks or disagrees on.
    pub fn is_in_sync(&self) -> bool {
        self.only_host1.is_empty() && self.only_host2.is_empty() && self.different.is_empty()
    }
}

/// Classifies every slot of the snapshot relative to `host1` and `host2`.
///
/// # Errors
/// - `HostNotFound` for the first of `host1`, `host2` outside the universe.
pub fn compare<C: Category>(
    snapshot: &Snapshot<C>,
    host1: &str,
    host2: &str,
) -> ReconcileResult<CategoryComparison<C>> {
    let first = snapshot.require_host(host1)?;
    let second = snapshot.require_host(host2)?;

    let mut result = Comparison {
        only_host1: Vec::new(),
        only_host2: Vec::new(),
        matching: Vec::new(),
        different: Vec::new(),
    };

    for (index, slot) in snapshot.slots().iter().enumerate() {
        match (snapshot.cell(first, index), snapshot.cell(second, index)) {
            (Some(value), None) => result.only_host1.push(SlotValue {
                slot: slot.clone(),
                value: value.clone(),
            }),
            (None, Some(value)) => result.only_host2.push(SlotValue {
                slot: slot.clone(),
                value: value.clone(),
            }),
            (Some(value1), Some(value2)) if value1 == value2 => {
                result.matching.push(SlotValue {
                    slot: slot.clone(),
                    value: value1.clone(),
                })
            }
            (Some(value1), Some(value2)) => result.different.push(SlotDifference {
                slot: slot.clone(),
                host1_value: value1.clone(),
                host2_value: value2.clone(),
            }),
            (None, None) => {}
        }
    }

    Ok(result)
}
