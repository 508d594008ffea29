//! Repository-wide suppression rules compiled to glob matchers.

use globset::{Glob, GlobMatcher};
use skillgate_types::error::ConfigError;
use skillgate_types::finding::Category;
use skillgate_types::suppression::{SuppressionFile, SuppressionRule};

/// What a rule's `pattern` field selects.
#[derive(Debug, Clone)]
enum KeyMatcher {
    Category(Category),
    Glob(GlobMatcher),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: SuppressionRule,
    key: KeyMatcher,
    scope: GlobMatcher,
}

/// Compiled suppression table. Rules are tried in file order.
#[derive(Debug, Clone, Default)]
pub struct SuppressionSet {
    rules: Vec<CompiledRule>,
}

impl SuppressionSet {
    pub fn compile(file: &SuppressionFile) -> Result<Self, ConfigError> {
        file.validate()?;

        let rules = file
            .suppressions
            .iter()
            .map(|rule| {
                let key = match Category::from_name(rule.pattern.trim()) {
                    Some(category) => KeyMatcher::Category(category),
                    None => KeyMatcher::Glob(compile_glob(rule.pattern.trim())?),
                };
                Ok(CompiledRule {
                    rule: rule.clone(),
                    key,
                    scope: compile_glob(rule.scope.trim())?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule that suppresses detector `key` (in `category`) at `path`.
    pub fn matching(&self, category: Category, key: &str, path: &str) -> Option<&SuppressionRule> {
        self.rules
            .iter()
            .find(|compiled| {
                let key_matches = match &compiled.key {
                    KeyMatcher::Category(c) => *c == category,
                    KeyMatcher::Glob(glob) => glob.is_match(key),
                };
                key_matches && compiled.scope.is_match(path)
            })
            .map(|compiled| &compiled.rule)
    }
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_owned(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rule(pattern: &str, scope: &str) -> SuppressionRule {
        SuppressionRule {
            pattern: pattern.to_owned(),
            scope: scope.to_owned(),
            reason: "fixture".to_owned(),
            approver: "security-team".to_owned(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap(),
        }
    }

    fn set(rules: Vec<SuppressionRule>) -> SuppressionSet {
        SuppressionSet::compile(&SuppressionFile {
            suppressions: rules,
        })
        .unwrap()
    }

    #[test]
    fn category_key_and_glob_patterns() {
        let set = set(vec![
            rule("encoded-payload", "**"),
            rule("sensitive-path/ssh-*", "skills/audit/**"),
        ]);

        assert!(set
            .matching(Category::EncodedPayload, "encoded-payload/base64-blob", "any/SKILL.md")
            .is_some());
        assert!(set
            .matching(Category::SensitivePath, "sensitive-path/ssh-key", "skills/audit/SKILL.md")
            .is_some());
        assert!(set
            .matching(Category::SensitivePath, "sensitive-path/ssh-key", "skills/other/SKILL.md")
            .is_none());
        assert!(set
            .matching(Category::SensitivePath, "sensitive-path/dotenv", "skills/audit/SKILL.md")
            .is_none());
    }

    #[test]
    fn first_rule_wins() {
        let mut second = rule("sensitive-path/*", "**");
        second.reason = "second".to_owned();
        let set = set(vec![rule("sensitive-path", "**"), second]);
        let hit = set
            .matching(Category::SensitivePath, "sensitive-path/netrc", "a.md")
            .unwrap();
        assert_eq!(hit.reason, "fixture");
    }

    #[test]
    fn invalid_glob_is_config_error() {
        let file = SuppressionFile {
            suppressions: vec![rule("sensitive-path/[", "**")],
        };
        let err = SuppressionSet::compile(&file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }

    #[test]
    fn unapproved_rule_is_rejected() {
        let mut bad = rule("sensitive-path", "**");
        bad.approver = " ".to_owned();
        let file = SuppressionFile {
            suppressions: vec![bad],
        };
        assert!(matches!(
            SuppressionSet::compile(&file),
            Err(ConfigError::InvalidSuppression { index: 0, .. })
        ));
    }
}
