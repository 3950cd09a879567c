//! Domain model for per-host configuration records.
//!
//! # Responsibility
//! - Define the `Category` capability shared by settings, keybindings and
//!   jump points.
//! - Define the slot and value shapes each category compares and copies.
//!
//! # Invariants
//! - A record is identified by `(hostname, slot)`; the category's table keeps
//!   that pair unique.
//! - Comparison uses `Category::Value` equality only. Extra columns such as
//!   descriptions ride along on copy but never affect classification.

pub mod category;
pub mod record;
pub mod value;
