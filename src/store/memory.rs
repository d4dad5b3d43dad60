//! In-process store.

use std::sync::RwLock;

use crate::store::change::{diff_items, Listeners};
use crate::store::{ChangeSet, Listener, Store, StoreError, StoreMap, SubscriptionId};

/// Store kept entirely in memory. Subscribers are notified synchronously
/// on the writer's thread.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreMap>,
    listeners: Listeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `data`.
    pub fn with_data(data: StoreMap) -> Self {
        Self {
            data: RwLock::new(data),
            listeners: Listeners::default(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Store for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        let data = self.data.read().unwrap_or_else(|p| p.into_inner());
        Ok(keys
            .iter()
            .filter_map(|key| data.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, items: StoreMap) -> Result<(), StoreError> {
        let changes: ChangeSet = {
            let mut data = self.data.write().unwrap_or_else(|p| p.into_inner());
            let changes = diff_items(&data, &items);
            data.extend(items);
            changes
        };
        self.listeners.notify(&changes);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_get_omits_absent_keys() {
        let store = MemoryStore::new();
        let mut items = StoreMap::new();
        items.insert("a".into(), json!(1));
        store.set(items).unwrap();

        let got = store.get(&["a", "b"]).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["a"], json!(1));
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        store.subscribe(Arc::new(move |changes: &ChangeSet| {
            s.lock().unwrap().push(changes.keys().cloned().collect::<Vec<_>>());
        }));

        let mut items = StoreMap::new();
        items.insert("a".into(), json!(1));
        store.set(items.clone()).unwrap();
        // Same value again: nothing to deliver.
        store.set(items).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![vec!["a".to_string()]]);
    }
}
