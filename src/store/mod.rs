//! Shared key-value store for rules and stats.
//!
//! # Data Flow
//! ```text
//! Surface writes (set)
//!     → backend (memory.rs / file.rs) applies the keys
//!     → change.rs computes the ChangeSet (only keys whose value changed)
//!     → every subscriber callback runs with the ChangeSet
//!
//! Another process writes the store file:
//!     watcher.rs sees the file event
//!     → FileStore::reload diffs disk against the cached map
//!     → subscribers run as above
//! ```
//!
//! # Design Decisions
//! - The store is the single source of truth; surfaces only cache it
//! - No locking across surfaces: last write wins per key
//! - Read failures degrade to empty data; write failures go back to the caller
//! - Failures are never retried

pub mod change;
pub mod file;
pub mod memory;
pub mod watcher;

pub use change::{ChangeSet, Listener, StorageChange, SubscriptionId};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use watcher::StoreWatcher;

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::observability::metrics;
use crate::rules::Rule;
use crate::stats::StatsMap;

/// Key holding the ordered rule list.
pub const RULES_KEY: &str = "redirectionRules";

/// Key holding the stats map.
pub const STATS_KEY: &str = "redirectionStats";

/// Raw store contents: key → JSON value.
pub type StoreMap = Map<String, Value>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store file {0} does not hold a JSON object")]
    NotAnObject(PathBuf),
}

/// A key-value store with change notification.
pub trait Store: Send + Sync {
    /// Read the given keys; absent keys are left out of the result.
    fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError>;

    /// Replace each given key, then notify subscribers of actual changes.
    fn set(&self, items: StoreMap) -> Result<(), StoreError>;

    /// Register a callback invoked with every non-empty change set.
    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Decode a stored rule list. Missing or `null` is empty; malformed is logged and empty.
pub fn rules_from_value(value: Option<&Value>) -> Vec<Rule> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            tracing::error!(key = RULES_KEY, error = %e, "Malformed rules in store, using empty list");
            metrics::record_store_error("decode");
            Vec::new()
        }),
    }
}

/// Decode a stored stats map. Missing or `null` is empty; malformed is logged and empty.
pub fn stats_from_value(value: Option<&Value>) -> StatsMap {
    match value {
        None | Some(Value::Null) => StatsMap::new(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            tracing::error!(key = STATS_KEY, error = %e, "Malformed stats in store, using empty map");
            metrics::record_store_error("decode");
            StatsMap::new()
        }),
    }
}

/// Load the rule list, degrading to empty on failure.
pub fn load_rules(store: &dyn Store) -> Vec<Rule> {
    match store.get(&[RULES_KEY]) {
        Ok(map) => rules_from_value(map.get(RULES_KEY)),
        Err(e) => {
            tracing::error!(error = %e, "Error loading rules from store");
            metrics::record_store_error("load");
            Vec::new()
        }
    }
}

/// Load the stats map, degrading to empty on failure.
pub fn load_stats(store: &dyn Store) -> StatsMap {
    match store.get(&[STATS_KEY]) {
        Ok(map) => stats_from_value(map.get(STATS_KEY)),
        Err(e) => {
            tracing::error!(error = %e, "Error loading stats from store");
            metrics::record_store_error("load");
            StatsMap::new()
        }
    }
}

pub fn save_rules(store: &dyn Store, rules: &[Rule]) -> Result<(), StoreError> {
    let mut items = StoreMap::new();
    items.insert(RULES_KEY.to_string(), serde_json::to_value(rules)?);
    store.set(items)
}

pub fn save_stats(store: &dyn Store, stats: &StatsMap) -> Result<(), StoreError> {
    let mut items = StoreMap::new();
    items.insert(STATS_KEY.to_string(), serde_json::to_value(stats)?);
    store.set(items)
}
