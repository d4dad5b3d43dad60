//! URL normalization for matching.
//!
//! Textual only: no URL parsing, no case folding, query and fragment are
//! left in place. Stored rules are never rewritten by this.

const SCHEMES: [&str; 2] = ["http://", "https://"];
const DEFAULT_SCHEME: &str = "https://";

/// Strip a leading `http://`/`https://`, then a leading `www.`.
pub fn normalize_url(url: &str) -> &str {
    let rest = SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or(url);
    rest.strip_prefix("www.").unwrap_or(rest)
}

/// Scheme of `url` including `://`, or `https://` when it has none.
pub fn detect_scheme(url: &str) -> &'static str {
    SCHEMES
        .iter()
        .find(|scheme| url.starts_with(*scheme))
        .copied()
        .unwrap_or(DEFAULT_SCHEME)
}

/// Whether `url` starts with `http://` or `https://`.
pub fn has_scheme(url: &str) -> bool {
    SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}
