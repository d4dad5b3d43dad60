//! Input boundary URL validation.
//!
//! Only the management surfaces call this. Imported rules and rules already in
//! the store are taken as they are.

/// Returns true if `value` parses as an absolute URL.
pub fn validate_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}
