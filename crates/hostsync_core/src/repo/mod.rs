//! Repository layer: the configuration store contract and its SQLite
//! implementation.
//!
//! # Responsibility
//! - Define the row-store operations reconciliation relies on: ordered
//!   distinct queries, full scans, point lookups and upserts.
//! - Isolate SQLite query details from reconciliation logic.
//!
//! # Invariants
//! - Upserts are keyed by `hostname` plus the category's slot columns.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod config_repo;
