//! Host-to-host reconciliation over one configuration category.
//!
//! # Responsibility
//! - Load a category into a dense `host x slot` snapshot.
//! - Classify slots between two hosts and copy selected values across.
//!
//! # Invariants
//! - Host and slot universes are fixed when the snapshot is loaded.
//! - Copy writes a slot to the store before updating the snapshot, and only
//!   when the destination value actually differs.
//! - Multi-slot copy is not atomic: slots before a failing slot stay copied.

use crate::repo::config_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod compare;
pub mod copy;
pub mod snapshot;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors from compare/copy.
///
/// Slot payloads are rendered with the slot's `Display` label so one error
/// type serves every category.
#[derive(Debug)]
pub enum ReconcileError {
    /// Host is outside the loaded host universe.
    HostNotFound(String),
    /// Slot is outside the loaded slot universe.
    SlotNotFound(String),
    /// Copy source host has no value for the slot.
    MissingSource(String),
    /// Source row needed to carry extra columns was not found in the store.
    DependentReadFailure { host: String, slot: String },
    /// Store-level failure.
    Repo(RepoError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostNotFound(host) => write!(f, "host `{host}` does not exist"),
            Self::SlotNotFound(slot) => write!(f, "slot `{slot}` does not exist"),
            Self::MissingSource(slot) => {
                write!(f, "cannot copy missing value for slot `{slot}`")
            }
            Self::DependentReadFailure { host, slot } => write!(
                f,
                "source row for host `{host}` slot `{slot}` not found in store"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReconcileError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl ReconcileError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HostNotFound(_) => "host_not_found",
            Self::SlotNotFound(_) => "slot_not_found",
            Self::MissingSource(_) => "missing_source",
            Self::DependentReadFailure { .. } => "dependent_read_failure",
            Self::Repo(_) => "repo_error",
        }
    }
}
