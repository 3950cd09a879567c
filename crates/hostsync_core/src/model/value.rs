//! Compared payload types.
//!
//! # Invariants
//! - `SettingValue` numeric variants compare by exact numeric value, so `1`
//!   and `1.0` are the same setting but `2^53 + 1` and `2^53 as f64` are not.
//! - `KeyList` equality is order-sensitive: `[ctrl, h]` and `[h, ctrl]` are
//!   different bindings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Scalar setting payload stored in `settings.data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl PartialEq for SettingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Integer(a), Self::Real(b)) | (Self::Real(b), Self::Integer(a)) => {
                integer_equals_real(*a, *b)
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact integer/real equality; `i64 as f64` rounds above 2^53.
fn integer_equals_real(integer: i64, real: f64) -> bool {
    // 2^63, the first real outside the i64 range.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if !real.is_finite() || real.fract() != 0.0 || real < -I64_BOUND || real >= I64_BOUND {
        return false;
    }
    real as i64 == integer
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered key-code sequence bound to a keybinding or jump point.
///
/// Persisted as a JSON array of strings in the `keylist` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyList(Vec<String>);

impl KeyList {
    /// Builds a key list from anything yielding key names.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }
}

/// Renders as `[ctrl, h]`.
impl Display for KeyList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
