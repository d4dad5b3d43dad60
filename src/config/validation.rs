//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, status codes and ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RedirectorConfig;

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// A single semantic problem in the config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed config, collecting every problem.
pub fn validate_config(config: &RedirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.store.path.trim().is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }
    if config.store.watch && config.store.poll_interval_secs == 0 {
        errors.push(ValidationError::new("store.poll_interval_secs", "must be > 0"));
    }

    if config.gateway.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "gateway.bind_address",
            format!("`{}` is not a socket address", config.gateway.bind_address),
        ));
    }
    if !matches!(config.gateway.default_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "gateway.default_scheme",
            "must be `http` or `https`",
        ));
    }
    if !REDIRECT_STATUSES.contains(&config.gateway.redirect_status) {
        errors.push(ValidationError::new(
            "gateway.redirect_status",
            format!("{} is not a redirect status", config.gateway.redirect_status),
        ));
    }
    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::new("gateway.request_timeout_secs", "must be > 0"));
    }

    if config.matcher.excluded_prefixes.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::new(
            "matcher.excluded_prefixes",
            "empty prefix would exclude every URL",
        ));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new("admin.api_key", "required when admin is enabled"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&RedirectorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RedirectorConfig::default();
        config.gateway.redirect_status = 404;
        config.gateway.default_scheme = "ftp".into();
        config.admin.enabled = true;
        config.admin.api_key = String::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["gateway.default_scheme", "gateway.redirect_status", "admin.api_key"]
        );
    }

    #[test]
    fn test_empty_exclusion_rejected() {
        let mut config = RedirectorConfig::default();
        config.matcher.excluded_prefixes.push(String::new());
        assert!(validate_config(&config).is_err());
    }
}
