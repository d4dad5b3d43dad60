//! Change sets and subscriber bookkeeping.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::store::StoreMap;

/// Old and new value of one changed key. `None` means absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Changed keys and their values.
pub type ChangeSet = BTreeMap<String, StorageChange>;

/// Subscriber callback.
pub type Listener = Arc<dyn Fn(&ChangeSet) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Changes from writing `items` over `current`.
pub fn diff_items(current: &StoreMap, items: &StoreMap) -> ChangeSet {
    items
        .iter()
        .filter(|(key, value)| current.get(*key) != Some(*value))
        .map(|(key, value)| {
            (
                key.clone(),
                StorageChange {
                    old_value: current.get(key).cloned(),
                    new_value: Some(value.clone()),
                },
            )
        })
        .collect()
}

/// Changes between two full snapshots, including removed keys.
pub fn diff_maps(old: &StoreMap, new: &StoreMap) -> ChangeSet {
    let mut changes = diff_items(old, new);
    for (key, value) in old {
        if !new.contains_key(key) {
            changes.insert(
                key.clone(),
                StorageChange {
                    old_value: Some(value.clone()),
                    new_value: None,
                },
            );
        }
    }
    changes
}

/// Registered subscribers of one store.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl Listeners {
    pub fn add(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    pub fn remove(&self, id: SubscriptionId) {
        self.lock().retain(|(entry_id, _)| *entry_id != id);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every callback. Callbacks run outside the registry lock, so they
    /// may read the store or subscribe again.
    pub fn notify(&self, changes: &ChangeSet) {
        if changes.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.lock().iter().map(|(_, l)| l.clone()).collect();
        tracing::debug!(
            keys = ?changes.keys().collect::<Vec<_>>(),
            subscribers = listeners.len(),
            "Store changed"
        );
        for listener in listeners {
            listener(changes);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> StoreMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unchanged_keys_not_reported() {
        let current = map(json!({"a": 1, "b": 2}));
        let changes = diff_items(&current, &map(json!({"a": 1, "b": 3})));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["b"].old_value, Some(json!(2)));
        assert_eq!(changes["b"].new_value, Some(json!(3)));
    }

    #[test]
    fn test_removed_keys_reported() {
        let changes = diff_maps(&map(json!({"a": 1})), &StoreMap::new());
        assert_eq!(changes["a"].new_value, None);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let listeners = Listeners::default();
        let hits = Arc::new(AtomicU64::new(0));
        let h = hits.clone();
        let id = listeners.add(Arc::new(move |_: &ChangeSet| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        let changes = diff_items(&StoreMap::new(), &map(json!({"a": 1})));
        listeners.notify(&changes);
        listeners.remove(id);
        listeners.notify(&changes);
        listeners.notify(&ChangeSet::new());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }
}
