//! Rule definition.

use serde::{Deserialize, Serialize};

/// A source-prefix to destination-prefix mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    /// URL or URL prefix to match.
    #[serde(default)]
    pub source: String,

    /// URL or URL prefix to redirect to.
    #[serde(default)]
    pub destination: String,

    /// Disabled rules are skipped during matching.
    #[serde(default)]
    pub enabled: bool,
}

impl Rule {
    /// Create an enabled rule.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            enabled: true,
        }
    }

    /// A fresh rule as added from the management surface.
    pub fn blank() -> Self {
        Self::new("", "")
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let rule: Rule = serde_json::from_str(r#"{"source":"a.com"}"#).unwrap();
        assert_eq!(rule.source, "a.com");
        assert_eq!(rule.destination, "");
        assert!(!rule.enabled);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(Rule::new("https://old.com", "https://new.com")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "https://old.com",
                "destination": "https://new.com",
                "enabled": true
            })
        );
    }
}
