//! Repository-wide suppression rules.
//!
//! Maintainers edit `suppressions.toml` out-of-band; each entry is an audited
//! exception that demotes matching pattern findings to `Info`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// One audited suppression entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuppressionRule {
    /// Category name, detector key (`category/name`), or a glob over keys.
    pub pattern: String,
    /// Glob over repository-relative paths.
    pub scope: String,
    pub reason: String,
    pub approver: String,
    /// RFC 3339, either quoted or as a bare TOML datetime.
    #[serde(deserialize_with = "approval_time")]
    pub timestamp: DateTime<Utc>,
}

fn approval_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let text = match toml::Value::deserialize(deserializer)? {
        toml::Value::String(s) => s,
        toml::Value::Datetime(dt) => dt.to_string(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "timestamp must be an RFC 3339 datetime, found {}",
                other.type_str()
            )));
        }
    };
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{text}': {e}")))
}

impl SuppressionRule {
    /// Audit text attached to findings this rule suppresses.
    pub fn justification(&self) -> String {
        format!(
            "{} (approved by {} on {})",
            self.reason,
            self.approver,
            self.timestamp.format("%Y-%m-%d")
        )
    }
}

/// The persisted `suppressions.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuppressionFile {
    #[serde(default)]
    pub suppressions: Vec<SuppressionRule>,
}

impl SuppressionFile {
    /// Every rule needs a pattern, a scope, a reason and an approver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, rule) in self.suppressions.iter().enumerate() {
            let missing = [
                ("pattern", &rule.pattern),
                ("scope", &rule.scope),
                ("reason", &rule.reason),
                ("approver", &rule.approver),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = missing {
                return Err(ConfigError::InvalidSuppression {
                    index,
                    message: format!("'{field}' must not be empty"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[suppressions]]
pattern = "sensitive-path/*"
scope = "skills/secrets-audit/**"
reason = "audit skill names credential paths on purpose"
approver = "security-team"
timestamp = "2026-01-12T09:00:00Z"
"#;

    #[test]
    fn parses_rules() {
        let file: SuppressionFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(file.suppressions.len(), 1);
        let rule = &file.suppressions[0];
        assert_eq!(rule.pattern, "sensitive-path/*");
        assert!(rule.justification().contains("security-team"));
        assert!(rule.justification().contains("2026-01-12"));
        assert!(file.validate().is_ok());
    }

    #[test]
    fn accepts_bare_toml_datetime() {
        let bare = SAMPLE.replace("\"2026-01-12T09:00:00Z\"", "2026-01-12T09:00:00Z");
        let file: SuppressionFile = toml::from_str(&bare).unwrap();
        let quoted: SuppressionFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(file.suppressions[0].timestamp, quoted.suppressions[0].timestamp);

        let offset = SAMPLE.replace("\"2026-01-12T09:00:00Z\"", "2026-01-12T11:00:00+02:00");
        let file: SuppressionFile = toml::from_str(&offset).unwrap();
        assert_eq!(file.suppressions[0].timestamp, quoted.suppressions[0].timestamp);
    }

    #[test]
    fn rejects_timestamp_without_offset() {
        let local = SAMPLE.replace("\"2026-01-12T09:00:00Z\"", "2026-01-12T09:00:00");
        let err = toml::from_str::<SuppressionFile>(&local).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn json_string_timestamp_parses() {
        let json = r#"{"suppressions":[{"pattern":"p","scope":"**","reason":"r","approver":"a","timestamp":"2026-01-12T09:00:00Z"}]}"#;
        let file: SuppressionFile = serde_json::from_str(json).unwrap();
        assert!(file.suppressions[0].justification().contains("2026-01-12"));
    }

    #[test]
    fn empty_file_has_no_rules() {
        let file: SuppressionFile = toml::from_str("").unwrap();
        assert!(file.suppressions.is_empty());
    }

    #[test]
    fn rejects_rule_without_approver() {
        let mut file: SuppressionFile = toml::from_str(SAMPLE).unwrap();
        file.suppressions[0].approver = String::new();
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("approver"));
    }
}
