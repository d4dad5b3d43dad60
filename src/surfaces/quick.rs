//! Quick-access surface: at-a-glance summary and on/off toggles.

use std::sync::Arc;

use serde::Serialize;

use crate::store::Store;
use crate::surfaces::{ManageError, SurfaceCache};

/// Counts shown by the quick-access view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub active_rules: usize,
    pub total_rules: usize,
    pub total_redirects: u64,
    /// Label of the toggle-all action in the current state.
    pub toggle_all_label: &'static str,
}

pub struct QuickAccess {
    cache: SurfaceCache,
}

impl QuickAccess {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            cache: SurfaceCache::new(store),
        }
    }

    pub fn summary(&self) -> Summary {
        let rules = self.cache.rules();
        let active_rules = rules.iter().filter(|r| r.enabled).count();
        let total_redirects = self.cache.stats().values().map(|s| s.count).sum();

        Summary {
            active_rules,
            total_rules: rules.len(),
            total_redirects,
            toggle_all_label: if active_rules == 0 {
                "Enable All Rules"
            } else {
                "Disable All Rules"
            },
        }
    }

    /// Flip one rule; returns its new state.
    pub fn toggle_rule(&self, index: usize) -> Result<bool, ManageError> {
        let mut rules = self.cache.rules();
        let len = rules.len();
        let rule = rules
            .get_mut(index)
            .ok_or(ManageError::NoSuchRule { index, len })?;
        rule.enabled = !rule.enabled;
        let enabled = rule.enabled;

        self.cache.commit_rules(rules)?;
        tracing::info!(index, enabled, "Rule toggled");
        Ok(enabled)
    }

    /// Enable every rule when none is enabled, otherwise disable every rule.
    /// Returns the state applied.
    pub fn toggle_all(&self) -> Result<bool, ManageError> {
        let mut rules = self.cache.rules();
        let enable = !rules.iter().any(|r| r.enabled);
        for rule in &mut rules {
            rule.enabled = enable;
        }

        self.cache.commit_rules(rules)?;
        tracing::info!(enabled = enable, "All rules toggled");
        Ok(enable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::stats::StatsRecorder;
    use crate::store::{self, MemoryStore};

    fn quick(rules: &[Rule]) -> (Arc<MemoryStore>, QuickAccess) {
        let store = Arc::new(MemoryStore::new());
        store::save_rules(store.as_ref(), rules).unwrap();
        let quick = QuickAccess::new(store.clone());
        (store, quick)
    }

    #[test]
    fn test_summary_counts() {
        let (store, quick) = quick(&[
            Rule::new("a.com", "b.com"),
            Rule::new("c.com", "d.com").disabled(),
        ]);
        let recorder = StatsRecorder::new();
        recorder.record("a.com", "b.com", 1);
        recorder.record("a.com", "b.com", 2);
        store::save_stats(store.as_ref(), &recorder.snapshot()).unwrap();

        assert_eq!(
            quick.summary(),
            Summary {
                active_rules: 1,
                total_rules: 2,
                total_redirects: 2,
                toggle_all_label: "Disable All Rules",
            }
        );
    }

    #[test]
    fn test_toggle_all_flips_between_states() {
        let (store, quick) = quick(&[
            Rule::new("a.com", "b.com"),
            Rule::new("c.com", "d.com").disabled(),
        ]);

        // Some enabled: disable everything.
        assert!(!quick.toggle_all().unwrap());
        assert!(store::load_rules(store.as_ref()).iter().all(|r| !r.enabled));
        assert_eq!(quick.summary().toggle_all_label, "Enable All Rules");

        // None enabled: enable everything.
        assert!(quick.toggle_all().unwrap());
        assert!(store::load_rules(store.as_ref()).iter().all(|r| r.enabled));
    }

    #[test]
    fn test_toggle_single_rule() {
        let (store, quick) = quick(&[Rule::new("a.com", "b.com")]);
        assert!(!quick.toggle_rule(0).unwrap());
        assert!(!store::load_rules(store.as_ref())[0].enabled);
        assert!(quick.toggle_rule(1).is_err());
    }
}
