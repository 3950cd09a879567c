//! Category entry points.
//!
//! # Responsibility
//! - Pair a configuration store with its loaded snapshot.
//! - Expose `hosts` / `compare` / `copy` per category for callers and the CLI.

pub mod reconcile_service;
