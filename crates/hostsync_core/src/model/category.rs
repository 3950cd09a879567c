//! Configuration categories and their slot types.
//!
//! # Responsibility
//! - Describe how each category names its slots and what value it compares.
//! - Keep reconciliation generic over one capability instead of per-table
//!   code paths.

use crate::model::value::{KeyList, SettingValue};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

/// Opaque host identifier as stored in the `hostname` column.
pub type HostName = String;

/// Capability describing one configuration category.
///
/// A category fixes the comparison unit (`Slot`), the compared payload
/// (`Value`) and any columns copied alongside the payload (`Extra`).
pub trait Category {
    /// Comparison/copy unit. `Display` renders the label used in errors and
    /// log events.
    type Slot: Clone + Eq + Hash + Ord + Debug + Display;
    /// Compared payload. Equality is structural.
    type Value: Clone + PartialEq + Debug;
    /// Columns carried on copy but excluded from comparison.
    type Extra: Clone + Default + PartialEq + Debug;

    /// Stable category name used in log events and the CLI.
    const NAME: &'static str;

    /// Whether copy must read the source row to carry `Extra` over.
    ///
    /// When `false`, copied records get `Extra::default()`.
    const PRESERVES_EXTRA: bool;
}

/// Scalar host settings keyed by setting name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings;

/// Key bindings keyed by `(context, action)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keybindings;

/// Jump-point shortcuts keyed by destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpPoints;

impl Category for Settings {
    type Slot = String;
    type Value = SettingValue;
    type Extra = ();

    const NAME: &'static str = "settings";
    const PRESERVES_EXTRA: bool = false;
}

impl Category for Keybindings {
    type Slot = ActionSlot;
    type Value = KeyList;
    /// Binding description.
    type Extra = Option<String>;

    const NAME: &'static str = "keybindings";
    const PRESERVES_EXTRA: bool = true;
}

impl Category for JumpPoints {
    type Slot = String;
    type Value = KeyList;
    /// Jump-point description.
    type Extra = Option<String>;

    const NAME: &'static str = "jumppoints";
    const PRESERVES_EXTRA: bool = true;
}

/// Keybinding slot: an action scoped to an input context.
///
/// Ordering is by `context`, then `action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionSlot {
    pub context: String,
    pub action: String,
}

impl ActionSlot {
    pub fn new(context: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            action: action.into(),
        }
    }
}

/// Renders as `context:action`.
impl Display for ActionSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.context, self.action)
    }
}

/// Error returned when a `context:action` label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionSlotError(String);

impl Display for ParseActionSlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid keybinding slot `{}`; expected `context:action`",
            self.0
        )
    }
}

impl Error for ParseActionSlotError {}

/// Parses `context:action`, splitting on the first `:` so actions may
/// themselves contain colons. Either part may be empty, as the table allows.
impl FromStr for ActionSlot {
    type Err = ParseActionSlotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once(':') {
            Some((context, action)) => Ok(Self::new(context, action)),
            None => Err(ParseActionSlotError(value.to_string())),
        }
    }
}
