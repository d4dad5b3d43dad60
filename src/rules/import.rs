//! Rule import and export.
//!
//! # Formats
//! - Current: JSON array of `Rule` objects
//! - Legacy: flat JSON object mapping source to destination, every entry enabled
//!
//! # Design Decisions
//! - Import replaces the whole list; a malformed file imports nothing
//! - Legacy entries keep the key order of the file

use serde_json::Value;

use crate::rules::Rule;

/// Error type for rule import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON file: expected an array of rules or a source-to-destination object")]
    UnsupportedShape,

    #[error("Invalid JSON file: destination for `{0}` is not a string")]
    LegacyDestination(String),
}

/// Parse an import file into a rule list.
pub fn parse_import(text: &str) -> Result<Vec<Rule>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(map) => map
            .into_iter()
            .map(|(source, destination)| match destination {
                Value::String(destination) => Ok(Rule::new(source, destination)),
                _ => Err(ImportError::LegacyDestination(source)),
            })
            .collect(),
        _ => Err(ImportError::UnsupportedShape),
    }
}

/// Serialize rules in the current (array) format.
pub fn export_rules(rules: &[Rule]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_import() {
        let rules = parse_import(r#"{"a.com":"b.com"}"#).unwrap();
        assert_eq!(rules, vec![Rule::new("a.com", "b.com")]);
    }

    #[test]
    fn test_legacy_import_keeps_order() {
        let rules = parse_import(r#"{"z.com":"1.com","a.com":"2.com"}"#).unwrap();
        let sources: Vec<_> = rules.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["z.com", "a.com"]);
    }

    #[test]
    fn test_array_import_preserves_enabled_flag() {
        let text = r#"[
            {"source": "https://old.com", "destination": "https://new.com", "enabled": false},
            {"source": "https://a.com", "destination": "https://b.com", "enabled": true}
        ]"#;
        let rules = parse_import(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(!rules[0].enabled);
        assert!(rules[1].enabled);
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(matches!(parse_import("{not json"), Err(ImportError::Json(_))));
        assert!(matches!(parse_import("42"), Err(ImportError::UnsupportedShape)));
        assert!(matches!(parse_import("null"), Err(ImportError::UnsupportedShape)));
        assert!(matches!(
            parse_import(r#"{"a.com": 3}"#),
            Err(ImportError::LegacyDestination(s)) if s == "a.com"
        ));
    }

    #[test]
    fn test_export_reimports() {
        let rules = vec![Rule::new("https://old.com", "https://new.com").disabled()];
        let text = export_rules(&rules).unwrap();
        assert_eq!(parse_import(&text).unwrap(), rules);
    }
}
