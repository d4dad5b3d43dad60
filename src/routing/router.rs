//! Rule table lookup.
//!
//! # Responsibilities
//! - Compile the ordered rule list into matchers
//! - Skip excluded URLs (extension pages, data URLs) before normalizing
//! - Return the first matching rule's replacement URL, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction; shared by `Arc` and swapped whole
//! - O(n) scan, rule lists are small
//! - Replacements without a scheme inherit the request's scheme

use crate::rules::Rule;
use crate::routing::matcher::{MatchKind, SourceMatcher};
use crate::routing::normalize::{detect_scheme, has_scheme, normalize_url};

/// Prefixes of URLs that are never redirected.
pub const DEFAULT_EXCLUDED_PREFIXES: [&str; 3] =
    ["moz-extension://", "chrome-extension://", "data:"];

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// URL to navigate to instead.
    pub url: String,
    /// Raw source of the matched rule, as stored.
    pub source: String,
    /// Raw destination of the matched rule, as stored.
    pub destination: String,
    /// Position of the rule in the full rule list.
    pub rule_index: usize,
    pub kind: MatchKind,
}

#[derive(Debug)]
struct CompiledRule {
    index: usize,
    matcher: SourceMatcher,
    source: String,
    destination: String,
}

/// Compiled, immutable view of the enabled rules.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
    excluded_prefixes: Vec<String>,
}

impl RuleTable {
    /// Compile a table from the ordered rule list.
    pub fn new(rules: &[Rule], excluded_prefixes: Vec<String>) -> Self {
        let rules = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.enabled && !rule.source.is_empty())
            .map(|(index, rule)| CompiledRule {
                index,
                matcher: SourceMatcher::new(&rule.source),
                source: rule.source.clone(),
                destination: rule.destination.clone(),
            })
            .collect();

        Self {
            rules,
            excluded_prefixes,
        }
    }

    /// Table with the default exclusions.
    pub fn with_default_exclusions(rules: &[Rule]) -> Self {
        Self::new(
            rules,
            DEFAULT_EXCLUDED_PREFIXES.iter().map(|p| p.to_string()).collect(),
        )
    }

    /// Empty table: nothing matches.
    pub fn empty(excluded_prefixes: Vec<String>) -> Self {
        Self::new(&[], excluded_prefixes)
    }

    /// Number of rules taking part in matching.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }

    /// Find the replacement for `url`, if any rule matches.
    pub fn resolve(&self, url: &str) -> Option<Redirect> {
        if self.is_excluded(url) {
            return None;
        }

        let normalized = normalize_url(url);
        tracing::trace!(url = %normalized, "Checking navigation");

        self.rules.iter().find_map(|rule| {
            let (kind, suffix) = rule.matcher.matches(normalized)?;
            let mut target = match kind {
                MatchKind::Exact => rule.destination.clone(),
                MatchKind::Prefix => format!("{}{}", rule.destination, suffix),
            };
            if !has_scheme(&target) {
                target.insert_str(0, detect_scheme(url));
            }

            Some(Redirect {
                url: target,
                source: rule.source.clone(),
                destination: rule.destination.clone(),
                rule_index: rule.index,
                kind,
            })
        })
    }
}
