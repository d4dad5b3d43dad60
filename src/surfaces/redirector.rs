//! Navigation redirector.
//!
//! # Responsibilities
//! - Keep a compiled rule table in sync with the store
//! - Resolve each navigation against it
//! - Record and persist a stat for every redirect
//!
//! # Design Decisions
//! - Rule table behind `ArcSwap`: lock-free reads on every navigation
//! - Stats persisted right after each redirect, no batching
//! - A failed stats write is logged; the redirect still happens
//! - Record and save run under one lock so concurrent redirects never
//!   persist a stale snapshot over a newer one

use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;

use crate::config::MatcherConfig;
use crate::observability::metrics;
use crate::routing::{Redirect, RuleTable};
use crate::stats::StatsRecorder;
use crate::store::{self, ChangeSet, Listener, Store, SubscriptionId, RULES_KEY, STATS_KEY};

/// Background surface that rewrites navigations.
pub struct Redirector {
    store: Arc<dyn Store>,
    table: Arc<ArcSwap<RuleTable>>,
    stats: Arc<StatsRecorder>,
    persist: Arc<Mutex<()>>,
    subscription: SubscriptionId,
}

impl Redirector {
    /// Load rules and stats from `store` and start following it.
    pub fn new(store: Arc<dyn Store>, config: &MatcherConfig) -> Self {
        let excluded = config.excluded_prefixes.clone();
        let rules = store::load_rules(store.as_ref());
        let table = Arc::new(ArcSwap::from_pointee(RuleTable::new(&rules, excluded.clone())));
        let stats = Arc::new(StatsRecorder::from_map(store::load_stats(store.as_ref())));
        let persist = Arc::new(Mutex::new(()));

        tracing::info!(
            rules = rules.len(),
            active = table.load().len(),
            "Redirector loaded"
        );

        let listener: Listener = {
            let table = table.clone();
            let stats = stats.clone();
            let persist = persist.clone();
            Arc::new(move |changes: &ChangeSet| {
                if let Some(change) = changes.get(RULES_KEY) {
                    let rules = store::rules_from_value(change.new_value.as_ref());
                    let compiled = RuleTable::new(&rules, excluded.clone());
                    tracing::info!(rules = rules.len(), active = compiled.len(), "Rules reloaded");
                    table.store(Arc::new(compiled));
                }
                if let Some(change) = changes.get(STATS_KEY) {
                    // Our own saves echo back on the saving thread with the
                    // persist lock held, and always match the live snapshot.
                    let incoming = store::stats_from_value(change.new_value.as_ref());
                    if incoming != stats.snapshot() {
                        let _guard = lock(&persist);
                        stats.replace(incoming);
                    }
                }
            })
        };
        let subscription = store.subscribe(listener);

        Self {
            store,
            table,
            stats,
            persist,
            subscription,
        }
    }

    /// Resolve a navigation. On a match the stat is recorded with `now_ms`.
    pub fn handle(&self, url: &str, now_ms: u64) -> Option<Redirect> {
        let table = self.table.load();
        if table.is_excluded(url) {
            metrics::record_navigation("excluded");
            return None;
        }

        let Some(redirect) = table.resolve(url) else {
            metrics::record_navigation("no_match");
            return None;
        };

        tracing::info!(
            from = %url,
            to = %redirect.url,
            rule = redirect.rule_index,
            kind = redirect.kind.as_str(),
            "Redirecting"
        );
        {
            let _guard = lock(&self.persist);
            self.stats.record(&redirect.source, &redirect.destination, now_ms);
            if let Err(e) = store::save_stats(self.store.as_ref(), &self.stats.snapshot()) {
                tracing::error!(error = %e, "Error saving stats");
                metrics::record_store_error("save");
            }
        }

        metrics::record_navigation("redirected");
        metrics::record_redirect(redirect.kind.as_str());
        Some(redirect)
    }

    /// Resolve without recording anything.
    pub fn preview(&self, url: &str) -> Option<Redirect> {
        self.table.load().resolve(url)
    }

    /// Number of rules currently taking part in matching.
    pub fn active_rules(&self) -> usize {
        self.table.load().len()
    }

    pub fn stats(&self) -> &StatsRecorder {
        &self.stats
    }
}

fn lock(persist: &Mutex<()>) -> MutexGuard<'_, ()> {
    persist.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Drop for Redirector {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
