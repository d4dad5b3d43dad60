//! Store file watcher for cross-process change notification.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::observability::metrics;
use crate::store::FileStore;

/// Watches the store file and reloads the store when another process writes it.
pub struct StoreWatcher {
    store: Arc<FileStore>,
    poll_interval: Duration,
}

impl StoreWatcher {
    pub fn new(store: Arc<FileStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Start watching in a background thread. Watching stops when the
    /// returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let store = self.store.clone();
        let path = self.store.path().to_path_buf();
        let file_name = path.file_name().map(|n| n.to_os_string());
        // Atomic writes replace the file, so watch its directory.
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let touches_store = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_store {
                        return;
                    }
                    if let Err(e) = store.reload() {
                        tracing::error!(error = %e, "Failed to reload store. Keeping cached data.");
                        metrics::record_store_error("reload");
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Store watcher started");
        Ok(watcher)
    }
}
