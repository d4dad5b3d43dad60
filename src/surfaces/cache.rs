//! Rule and stats cache shared by the management surfaces.

use std::sync::{Arc, RwLock};

use crate::rules::Rule;
use crate::stats::StatsMap;
use crate::store::{
    self, ChangeSet, Listener, Store, SubscriptionId, RULES_KEY, STATS_KEY,
};

/// Local copy of the store's rules and stats, refreshed by subscription.
pub struct SurfaceCache {
    store: Arc<dyn Store>,
    rules: Arc<RwLock<Vec<Rule>>>,
    stats: Arc<RwLock<StatsMap>>,
    subscription: SubscriptionId,
}

impl SurfaceCache {
    /// Load both keys and start following the store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let rules = Arc::new(RwLock::new(store::load_rules(store.as_ref())));
        let stats = Arc::new(RwLock::new(store::load_stats(store.as_ref())));

        let listener: Listener = {
            let rules = rules.clone();
            let stats = stats.clone();
            Arc::new(move |changes: &ChangeSet| {
                if let Some(change) = changes.get(RULES_KEY) {
                    *write(&rules) = store::rules_from_value(change.new_value.as_ref());
                }
                if let Some(change) = changes.get(STATS_KEY) {
                    *write(&stats) = store::stats_from_value(change.new_value.as_ref());
                }
            })
        };
        let subscription = store.subscribe(listener);

        Self {
            store,
            rules,
            stats,
            subscription,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn rules(&self) -> Vec<Rule> {
        read(&self.rules).clone()
    }

    pub fn stats(&self) -> StatsMap {
        read(&self.stats).clone()
    }

    /// Persist `rules` and adopt them locally once the write succeeded.
    pub fn commit_rules(&self, rules: Vec<Rule>) -> Result<(), store::StoreError> {
        store::save_rules(self.store(), &rules)?;
        *write(&self.rules) = rules;
        Ok(())
    }

    /// Persist `stats` and adopt them locally once the write succeeded.
    pub fn commit_stats(&self, stats: StatsMap) -> Result<(), store::StoreError> {
        store::save_stats(self.store(), &stats)?;
        *write(&self.stats) = stats;
        Ok(())
    }
}

impl Drop for SurfaceCache {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|p| p.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|p| p.into_inner())
}
