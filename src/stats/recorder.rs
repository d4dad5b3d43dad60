//! Stat entries and the in-memory recorder.

use std::collections::BTreeMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Stored form of the stats: key → entry.
pub type StatsMap = BTreeMap<String, Stat>;

/// Aggregated count for one rule pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub last_redirect: Option<u64>,
}

impl Stat {
    fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            count: 0,
            last_redirect: None,
        }
    }
}

/// Key under which a pair's stat is stored.
pub fn stat_key(source: &str, destination: &str) -> String {
    format!("{} -> {}", source, destination)
}

/// Thread-safe stats cache.
///
/// Concurrent navigations may record at the same time; each record touches
/// only its own entry.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    inner: DashMap<String, Stat>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(stats: StatsMap) -> Self {
        let recorder = Self::new();
        recorder.replace(stats);
        recorder
    }

    /// Count one redirect for the pair, creating the entry if absent.
    pub fn record(&self, source: &str, destination: &str, timestamp: u64) -> Stat {
        let mut entry = self
            .inner
            .entry(stat_key(source, destination))
            .or_insert_with(|| Stat::new(source, destination));
        entry.count += 1;
        entry.last_redirect = Some(timestamp);
        entry.value().clone()
    }

    /// Swap in a map read from the store.
    pub fn replace(&self, stats: StatsMap) {
        self.inner.clear();
        for (key, stat) in stats {
            self.inner.insert(key, stat);
        }
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn get(&self, source: &str, destination: &str) -> Option<Stat> {
        self.inner
            .get(&stat_key(source, destination))
            .map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sum of all counts.
    pub fn total_redirects(&self) -> u64 {
        self.inner.iter().map(|r| r.value().count).sum()
    }

    /// Copy of the cache in stored form.
    pub fn snapshot(&self) -> StatsMap {
        self.inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Entries ordered by descending count.
    pub fn sorted_by_count(&self) -> Vec<Stat> {
        sorted_by_count(&self.snapshot())
    }
}

/// Entries of `stats` ordered by descending count, ties by key.
pub fn sorted_by_count(stats: &StatsMap) -> Vec<Stat> {
    let mut entries: Vec<Stat> = stats.values().cloned().collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
