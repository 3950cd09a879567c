//! Stored configuration record.

use crate::model::category::{Category, HostName};

/// One row of a category table: the value a host assigns to a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord<C: Category> {
    pub hostname: HostName,
    pub slot: C::Slot,
    pub value: C::Value,
    /// Carried on copy, ignored by comparison.
    pub extra: C::Extra,
}

impl<C: Category> ConfigRecord<C> {
    pub fn new(
        hostname: impl Into<HostName>,
        slot: C::Slot,
        value: C::Value,
        extra: C::Extra,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            slot,
            value,
            extra,
        }
    }
}
