//! Rule management surface.
//!
//! # Responsibilities
//! - Add, edit, enable/disable and delete rules
//! - Import and export the rule list
//! - Present and clear statistics
//!
//! # Design Decisions
//! - URLs are validated here, at the input boundary, and nowhere else
//! - Every edit writes the whole rule list
//! - Rejected input leaves both the cache and the store untouched

use std::sync::Arc;

use crate::rules::{self, ImportError, Rule};
use crate::stats::{self, Stat, StatsMap};
use crate::store::{Store, StoreError};
use crate::surfaces::SurfaceCache;

/// Errors surfaced to the user of the management surface.
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error("Invalid URL format: `{0}`")]
    InvalidUrl(String),

    #[error("No rule at position {index} ({len} rules configured)")]
    NoSuchRule { index: usize, len: usize },

    #[error("Error importing rules: {0}")]
    Import(#[from] ImportError),

    #[error("Error exporting rules: {0}")]
    Export(#[from] serde_json::Error),

    #[error("Error saving to store: {0}")]
    Store(#[from] StoreError),
}

/// Which side of a rule is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Destination,
}

/// Management surface over the shared store.
pub struct RuleManager {
    cache: SurfaceCache,
}

impl RuleManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let cache = SurfaceCache::new(store);
        tracing::debug!(rules = cache.rules().len(), "Rule manager loaded");
        Self { cache }
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.cache.rules()
    }

    /// Stats ordered by descending count.
    pub fn stats_sorted(&self) -> Vec<Stat> {
        stats::sorted_by_count(&self.cache.stats())
    }

    /// Append a rule. Non-empty URLs must be valid. Returns its position.
    pub fn add_rule(&self, source: &str, destination: &str, enabled: bool) -> Result<usize, ManageError> {
        check_url(source)?;
        check_url(destination)?;

        self.push_rule(Rule {
            source: source.to_string(),
            destination: destination.to_string(),
            enabled,
        })
    }

    /// Append a blank enabled rule, to be filled in later.
    pub fn add_blank_rule(&self) -> Result<usize, ManageError> {
        self.push_rule(Rule::blank())
    }

    fn push_rule(&self, rule: Rule) -> Result<usize, ManageError> {
        let mut rules = self.cache.rules();
        rules.push(rule);
        let index = rules.len() - 1;
        self.save(rules)?;
        tracing::info!(index, "Rule added");
        Ok(index)
    }

    pub fn set_source(&self, index: usize, value: &str) -> Result<(), ManageError> {
        self.set_field(index, Field::Source, value)
    }

    pub fn set_destination(&self, index: usize, value: &str) -> Result<(), ManageError> {
        self.set_field(index, Field::Destination, value)
    }

    pub fn set_enabled(&self, index: usize, enabled: bool) -> Result<(), ManageError> {
        self.edit(index, |rule| rule.enabled = enabled)
    }

    /// Remove a rule and return it.
    pub fn delete_rule(&self, index: usize) -> Result<Rule, ManageError> {
        let mut rules = self.cache.rules();
        check_index(index, rules.len())?;
        let removed = rules.remove(index);
        self.save(rules)?;
        tracing::info!(index, source = %removed.source, "Rule deleted");
        Ok(removed)
    }

    /// Replace the whole rule list with the contents of an import file.
    pub fn import_json(&self, text: &str) -> Result<usize, ManageError> {
        let rules = rules::parse_import(text)?;
        let count = rules.len();
        self.save(rules)?;
        tracing::info!(count, "Rules imported");
        Ok(count)
    }

    /// Rule list in the export format.
    pub fn export_json(&self) -> Result<String, ManageError> {
        Ok(rules::export_rules(&self.cache.rules())?)
    }

    /// Default file name for an export taken at `now_ms`.
    pub fn export_file_name(now_ms: u64) -> String {
        format!("url-redirector-rules-{}.json", now_ms)
    }

    pub fn clear_stats(&self) -> Result<(), ManageError> {
        self.cache.commit_stats(StatsMap::new())?;
        tracing::info!("Statistics cleared");
        Ok(())
    }

    fn set_field(&self, index: usize, field: Field, value: &str) -> Result<(), ManageError> {
        check_url(value)?;
        self.edit(index, |rule| match field {
            Field::Source => rule.source = value.to_string(),
            Field::Destination => rule.destination = value.to_string(),
        })
    }

    fn edit(&self, index: usize, apply: impl FnOnce(&mut Rule)) -> Result<(), ManageError> {
        let mut rules = self.cache.rules();
        check_index(index, rules.len())?;
        apply(&mut rules[index]);
        tracing::debug!(index, rule = ?rules[index], "Rule updated");
        self.save(rules)
    }

    fn save(&self, rules: Vec<Rule>) -> Result<(), ManageError> {
        self.cache.commit_rules(rules).map_err(|e| {
            tracing::error!(error = %e, "Error saving rules");
            ManageError::from(e)
        })
    }
}

fn check_url(value: &str) -> Result<(), ManageError> {
    if value.is_empty() || rules::validate_url(value) {
        Ok(())
    } else {
        Err(ManageError::InvalidUrl(value.to_string()))
    }
}

fn check_index(index: usize, len: usize) -> Result<(), ManageError> {
    if index < len {
        Ok(())
    } else {
        Err(ManageError::NoSuchRule { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{self, MemoryStore};

    fn manager() -> (Arc<MemoryStore>, RuleManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = RuleManager::new(store.clone());
        (store, manager)
    }

    #[test]
    fn test_add_and_edit_rule() {
        let (store, manager) = manager();
        let index = manager.add_blank_rule().unwrap();
        manager.set_source(index, "https://old.com").unwrap();
        manager.set_destination(index, "https://new.com").unwrap();

        assert_eq!(
            store::load_rules(store.as_ref()),
            vec![Rule::new("https://old.com", "https://new.com")]
        );
    }

    #[test]
    fn test_blank_rule_is_enabled_and_empty() {
        let (store, manager) = manager();
        manager.add_rule("https://old.com", "https://new.com", false).unwrap();

        assert_eq!(manager.add_blank_rule().unwrap(), 1);
        let added = &store::load_rules(store.as_ref())[1];
        assert_eq!(added, &Rule::blank());
        assert!(added.enabled);
    }

    #[test]
    fn test_invalid_url_rejected_without_saving() {
        let (store, manager) = manager();
        manager.add_rule("https://old.com", "https://new.com", true).unwrap();

        let err = manager.set_destination(0, "new.com").unwrap_err();
        assert!(matches!(err, ManageError::InvalidUrl(_)));
        assert!(err.to_string().starts_with("Invalid URL format"));
        assert_eq!(store::load_rules(store.as_ref())[0].destination, "https://new.com");

        // Clearing a field is allowed.
        manager.set_destination(0, "").unwrap();
        assert_eq!(manager.rules()[0].destination, "");
    }

    #[test]
    fn test_out_of_range_index() {
        let (_store, manager) = manager();
        assert!(matches!(
            manager.set_enabled(0, false),
            Err(ManageError::NoSuchRule { index: 0, len: 0 })
        ));
        assert!(manager.delete_rule(3).is_err());
    }

    #[test]
    fn test_delete_keeps_order() {
        let (_store, manager) = manager();
        manager.add_rule("https://a.com", "https://x.com", true).unwrap();
        manager.add_rule("https://b.com", "https://x.com", true).unwrap();
        manager.add_rule("https://c.com", "https://x.com", false).unwrap();

        let removed = manager.delete_rule(1).unwrap();
        assert_eq!(removed.source, "https://b.com");
        let sources: Vec<_> = manager.rules().into_iter().map(|r| r.source).collect();
        assert_eq!(sources, vec!["https://a.com", "https://c.com"]);
    }

    #[test]
    fn test_import_replaces_list() {
        let (store, manager) = manager();
        manager.add_rule("https://a.com", "https://x.com", true).unwrap();

        assert_eq!(manager.import_json(r#"{"a.com":"b.com"}"#).unwrap(), 1);
        assert_eq!(
            store::load_rules(store.as_ref()),
            vec![Rule::new("a.com", "b.com")]
        );
    }

    #[test]
    fn test_malformed_import_changes_nothing() {
        let (store, manager) = manager();
        manager.add_rule("https://a.com", "https://x.com", true).unwrap();

        let err = manager.import_json("not json").unwrap_err();
        assert!(err.to_string().starts_with("Error importing rules: Invalid JSON file"));
        assert_eq!(store::load_rules(store.as_ref()).len(), 1);
    }

    #[test]
    fn test_export_and_file_name() {
        let (_store, manager) = manager();
        manager.add_rule("https://a.com", "https://b.com", false).unwrap();

        let text = manager.export_json().unwrap();
        assert_eq!(
            rules::parse_import(&text).unwrap(),
            vec![Rule::new("https://a.com", "https://b.com").disabled()]
        );
        assert_eq!(
            RuleManager::export_file_name(1700000000000),
            "url-redirector-rules-1700000000000.json"
        );
    }

    #[test]
    fn test_stats_view_and_clear() {
        let (store, manager) = manager();
        let recorder = stats::StatsRecorder::new();
        recorder.record("a.com", "b.com", 1);
        recorder.record("c.com", "d.com", 2);
        recorder.record("c.com", "d.com", 3);
        store::save_stats(store.as_ref(), &recorder.snapshot()).unwrap();

        let sorted = manager.stats_sorted();
        assert_eq!(sorted[0].source, "c.com");
        assert_eq!(sorted[0].count, 2);

        manager.clear_stats().unwrap();
        assert!(manager.stats_sorted().is_empty());
        assert!(store::load_stats(store.as_ref()).is_empty());
    }
}
