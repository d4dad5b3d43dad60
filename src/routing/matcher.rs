//! Rule source matching.
//!
//! # Responsibilities
//! - Hold a rule's normalized source
//! - Decide exact vs. path-prefix match against a normalized URL
//! - Hand back the path suffix that follows the source
//!
//! # Design Decisions
//! - Case-sensitive comparison
//! - Prefix match requires a `/` boundary: `old.com` never matches `old.company`

use crate::routing::normalize::normalize_url;

/// How a URL matched a rule source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized URL equals normalized source.
    Exact,
    /// Normalized URL is the source followed by `/` and more.
    Prefix,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
        }
    }
}

/// Matches normalized URLs against one normalized rule source.
#[derive(Debug, Clone)]
pub struct SourceMatcher {
    source: String,
}

impl SourceMatcher {
    /// Create a matcher; the source is normalized once here.
    pub fn new(source: &str) -> Self {
        Self {
            source: normalize_url(source).to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the match kind and the remainder after the source
    /// (empty for exact matches, starts with `/` for prefix matches).
    pub fn matches<'a>(&self, normalized_url: &'a str) -> Option<(MatchKind, &'a str)> {
        let rest = normalized_url.strip_prefix(self.source.as_str())?;
        if rest.is_empty() {
            Some((MatchKind::Exact, rest))
        } else if rest.starts_with('/') {
            Some((MatchKind::Prefix, rest))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let matcher = SourceMatcher::new("https://www.old.com");
        assert_eq!(matcher.source(), "old.com");
        assert_eq!(matcher.matches("old.com"), Some((MatchKind::Exact, "")));
    }

    #[test]
    fn test_prefix_match() {
        let matcher = SourceMatcher::new("https://old.com");
        assert_eq!(
            matcher.matches("old.com/page?x=1"),
            Some((MatchKind::Prefix, "/page?x=1"))
        );
        assert_eq!(matcher.matches("old.com/"), Some((MatchKind::Prefix, "/")));
    }

    #[test]
    fn test_requires_path_boundary() {
        let matcher = SourceMatcher::new("old.com");
        assert_eq!(matcher.matches("old.company"), None);
        assert_eq!(matcher.matches("old.com?x=1"), None);
        assert_eq!(matcher.matches("new.com/old.com"), None);
    }

    #[test]
    fn test_case_sensitive() {
        let matcher = SourceMatcher::new("old.com/Path");
        assert_eq!(matcher.matches("old.com/path"), None);
    }
}
