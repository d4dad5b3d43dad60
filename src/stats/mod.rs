//! Redirection statistics.
//!
//! # Responsibilities
//! - Count redirects per (source, destination) pair
//! - Remember when each pair last fired
//! - Aggregate totals for the quick-access summary
//!
//! # Design Decisions
//! - Keyed by the raw rule text, `"<source> -> <destination>"`
//! - Entries are created lazily on first fire
//! - Timestamps are milliseconds since the Unix epoch

pub mod recorder;

pub use recorder::{sorted_by_count, stat_key, Stat, StatsMap, StatsRecorder};

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Render a `lastRedirect` value as local date and time, or "Never".
pub fn format_last_redirect(last_redirect: Option<u64>) -> String {
    last_redirect
        .and_then(|ms| i64::try_from(ms).ok())
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_last_redirect() {
        assert_eq!(format_last_redirect(None), "Never");

        let ms = 1_700_000_000_000;
        let expected = Local
            .timestamp_millis_opt(ms as i64)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let formatted = format_last_redirect(Some(ms));
        assert_eq!(formatted, expected);
        assert!(formatted.starts_with("2023-11-1"));
        assert_ne!(formatted, ms.to_string());
    }
}
