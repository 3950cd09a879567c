//! Core logic for hostsync: compare and copy per-host configuration
//! (settings, keybindings, jump points) kept in a shared SQLite store.

pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{
    ActionSlot, Category, HostName, JumpPoints, Keybindings, ParseActionSlotError, Settings,
};
pub use model::record::ConfigRecord;
pub use model::value::{KeyList, SettingValue};
pub use reconcile::compare::{
    compare, CategoryComparison, Comparison, SlotDifference, SlotValue,
};
pub use reconcile::copy::{copy, CopyOutcome};
pub use reconcile::snapshot::{load, Snapshot};
pub use reconcile::{ReconcileError, ReconcileResult};
pub use repo::config_repo::{ConfigStore, RepoError, RepoResult, SqliteConfigStore, TableSchema};
pub use service::reconcile_service::{
    JumpPointsService, KeybindingsService, ReconcileService, SettingsService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
