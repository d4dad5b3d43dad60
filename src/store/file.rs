//! JSON file store shared between processes.
//!
//! # Responsibilities
//! - Persist the whole key-value map as one JSON object file
//! - Write atomically (unique temp file per write + rename)
//! - Re-read the file on demand and notify subscribers of outside changes
//!
//! # Design Decisions
//! - `set` merges into the file's current content, not the cached copy,
//!   so keys written by other processes survive
//! - A missing file is an empty store
//! - A write also reports keys another process changed since the last read
//! - Own writes never come back as notifications on `reload`

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::store::change::{diff_maps, Listeners};
use crate::store::{ChangeSet, Listener, Store, StoreError, StoreMap, SubscriptionId};

/// File-backed store.
pub struct FileStore {
    path: PathBuf,
    cache: Mutex<StoreMap>,
    listeners: Listeners,
}

impl FileStore {
    /// Open the store at `path`, reading the current contents.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = read_map(&path)?;
        tracing::debug!(path = ?path, keys = data.len(), "Store opened");
        Ok(Self {
            path,
            cache: Mutex::new(data),
            listeners: Listeners::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and notify subscribers of keys changed since the last
    /// read or write made through this handle.
    pub fn reload(&self) -> Result<ChangeSet, StoreError> {
        let changes = {
            let mut cache = self.lock();
            let fresh = read_map(&self.path)?;
            let changes = diff_maps(&cache, &fresh);
            *cache = fresh;
            changes
        };
        if !changes.is_empty() {
            tracing::info!(path = ?self.path, keys = changes.len(), "Store changed on disk");
        }
        self.listeners.notify(&changes);
        Ok(changes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreMap> {
        self.cache.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Store for FileStore {
    fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        let cache = self.lock();
        Ok(keys
            .iter()
            .filter_map(|key| cache.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, items: StoreMap) -> Result<(), StoreError> {
        let changes = {
            let mut cache = self.lock();
            let mut merged = read_map(&self.path)?;
            merged.extend(items);
            write_map(&self.path, &merged)?;
            let changes = diff_maps(&cache, &merged);
            *cache = merged;
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

fn read_map(path: &Path) -> Result<StoreMap, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreMap::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(StoreMap::new());
    }
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject(path.to_path_buf())),
    }
}

fn write_map(path: &Path, data: &StoreMap) -> Result<(), StoreError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    // Each write gets its own temp file so concurrent writers never share one.
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&serde_json::to_vec_pretty(data)?)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(key: &str, value: Value) -> StoreMap {
        let mut map = StoreMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.get(&["redirectionRules"]).unwrap().is_empty());
    }

    #[test]
    fn test_writes_persist_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set(item("a", json!([1, 2]))).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(&["a"]).unwrap()["a"], json!([1, 2]));
    }

    #[test]
    fn test_set_keeps_keys_written_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path).unwrap();
        first.set(item("a", json!(1))).unwrap();
        second.set(item("b", json!(2))).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let got = reopened.get(&["a", "b"]).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_reload_reports_outside_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path).unwrap();
        second.set(item("a", json!("x"))).unwrap();

        let changes = first.reload().unwrap();
        assert_eq!(changes["a"].new_value, Some(json!("x")));
        assert!(second.reload().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_writers_from_two_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let big = json!("x".repeat(64 * 1024));

        std::thread::scope(|s| {
            for key in ["a", "b"] {
                let store = FileStore::open(&path).unwrap();
                let big = big.clone();
                s.spawn(move || {
                    for _ in 0..50 {
                        store.set(item(key, big.clone())).unwrap();
                    }
                });
            }
        });

        let reopened = FileStore::open(&path).unwrap();
        assert!(!reopened.get(&["a", "b"]).unwrap().is_empty());
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_non_object_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::NotAnObject(_))));
    }
}
