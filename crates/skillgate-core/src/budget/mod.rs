//! Budget evaluation: per-role advisory targets and path-keyed overrides.
//!
//! Everything here is advisory except the suite ceiling, which lives in
//! [`context_load`].

pub mod context_load;

use skillgate_types::budget::{BudgetConfig, BudgetOverride, RoleBudget};
use skillgate_types::document::{Document, Role};
use skillgate_types::finding::{Category, Finding, Location};
use skillgate_types::report::{BudgetRow, BudgetStatus};

use crate::paths;

const REMEDIATION: &str =
    "extract checklists or examples into references/, tighten prose, or split the document";

/// The target that applies to one document and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveBudget<'a> {
    pub limit: RoleBudget,
    pub default: RoleBudget,
    /// The override key and entry, when one applies.
    pub source: Option<(&'a str, &'a BudgetOverride)>,
}

/// Evaluates documents against a read-only [`BudgetConfig`].
#[derive(Debug, Clone, Copy)]
pub struct BudgetEvaluator<'a> {
    config: &'a BudgetConfig,
}

impl<'a> BudgetEvaluator<'a> {
    pub fn new(config: &'a BudgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a BudgetConfig {
        self.config
    }

    /// Resolve the target for `path`: the longest component-prefix override
    /// that sets `max_tokens`, else the role default.
    pub fn effective(&self, path: &str, role: Role) -> EffectiveBudget<'a> {
        let default = self.config.roles.for_role(role);
        let source = self
            .config
            .overrides
            .iter()
            .filter(|(_, over)| over.max_tokens.is_some())
            .filter(|(key, _)| paths::has_prefix(path, &paths::normalize(key)))
            .max_by_key(|(key, _)| paths::normalize(key).len())
            .map(|(key, over)| (key.as_str(), over));

        let limit = source
            .and_then(|(_, over)| over.role_budget())
            .unwrap_or(default);

        EffectiveBudget {
            limit,
            default,
            source,
        }
    }

    /// The hard ceiling for the suite rooted at `root`. An override keyed by
    /// the root document or its directory may replace the global value.
    pub fn suite_ceiling(&self, root: &str) -> usize {
        let dir = paths::parent(root);
        self.config
            .overrides
            .iter()
            .filter(|(key, _)| {
                let key = paths::normalize(key);
                key == root || (!dir.is_empty() && key == dir)
            })
            .find_map(|(_, over)| over.suite_ceiling)
            .unwrap_or(self.config.suite_ceiling)
    }

    /// Advisory findings for one document.
    pub fn evaluate(&self, doc: &Document, role: Role) -> Vec<Finding> {
        let budget = self.effective(&doc.path, role);
        let limit = budget.limit;
        let tokens = doc.token_estimate;
        let mut findings = Vec::new();

        if tokens > limit.max_tokens {
            let token_over = tokens - limit.max_tokens;
            let word_over = doc.word_count.saturating_sub(limit.max_words);
            let percent = (token_over * 100).checked_div(limit.max_tokens).unwrap_or(100);
            findings.push(Finding::warn(
                Category::Budget,
                Location::file(&doc.path),
                format!(
                    "{tokens} tokens ({} words) exceeds the {role} budget of {} tokens / {} words by {token_over} tokens, {word_over} words ({percent}% over); {REMEDIATION}",
                    doc.word_count, limit.max_tokens, limit.max_words
                ),
            ));
        } else if tokens * 10 > limit.max_tokens * 9 {
            findings.push(Finding::info(
                Category::Budget,
                Location::file(&doc.path),
                format!(
                    "{tokens} tokens is within 10% of the {role} budget of {} tokens ({} left)",
                    limit.max_tokens,
                    limit.max_tokens - tokens
                ),
            ));
        }

        if let Some((key, over)) = budget.source {
            if limit.max_tokens < budget.default.max_tokens {
                findings.push(Finding::info(
                    Category::Budget,
                    Location::file(&doc.path),
                    format!(
                        "override '{key}' tightens the {role} budget to {} tokens (default {}): {}",
                        limit.max_tokens, budget.default.max_tokens, over.reason
                    ),
                ));
            }
        }

        findings
    }

    /// One row of the budget report.
    pub fn row(&self, doc: &Document, role: Role) -> BudgetRow {
        let budget = self.effective(&doc.path, role);
        let limit = budget.limit;
        let tokens = doc.token_estimate;
        let status = if tokens > limit.max_tokens {
            BudgetStatus::Over
        } else if tokens * 10 > limit.max_tokens * 9 {
            BudgetStatus::Near
        } else {
            BudgetStatus::Ok
        };

        BudgetRow {
            path: doc.path.clone(),
            role,
            words: doc.word_count,
            tokens,
            max_words: limit.max_words,
            max_tokens: limit.max_tokens,
            status,
            headroom: limit.max_tokens as i64 - tokens as i64,
            override_key: budget.source.map(|(key, _)| key.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;
    use skillgate_types::finding::Severity;

    fn with_override(key: &str, max_tokens: Option<usize>, suite: Option<usize>) -> BudgetConfig {
        let mut config = BudgetConfig::default();
        config.overrides.insert(
            key.to_owned(),
            BudgetOverride {
                max_tokens,
                max_words: None,
                suite_ceiling: suite,
                reason: "documented exception".to_owned(),
            },
        );
        config
    }

    #[test]
    fn oversized_coordinator_warns() {
        let config = BudgetConfig::default();
        let eval = BudgetEvaluator::new(&config);
        // 650 words -> 865 tokens against 600 / 800
        let findings = eval.evaluate(&doc("suite/SKILL.md", 650), Role::Coordinator);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.severity, Severity::Warn);
        assert!(f.message.contains("865 tokens"));
        assert!(f.message.contains("by 65 tokens, 50 words"));
        assert!(f.message.contains("8% over"));
        assert!(f.message.contains("references/"));
    }

    #[test]
    fn zero_role_ceiling_does_not_panic() {
        let mut config = BudgetConfig::default();
        config.roles.coordinator.max_tokens = 0;
        let eval = BudgetEvaluator::new(&config);
        let findings = eval.evaluate(&doc("s/SKILL.md", 10), Role::Coordinator);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("100% over"));
    }

    #[test]
    fn headroom_is_info() {
        let config = BudgetConfig::default();
        let eval = BudgetEvaluator::new(&config);
        // 1450 words -> 1929 tokens, above 90% of 2000
        let findings = eval.evaluate(&doc("a/SKILL.md", 1_450), Role::Standalone);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);

        // exactly at the ceiling is still headroom, not overage
        let mut exact = doc("a/SKILL.md", 0);
        exact.token_estimate = 2_000;
        let findings = eval.evaluate(&exact, Role::Standalone);
        assert_eq!(findings[0].severity, Severity::Info);

        assert!(eval.evaluate(&doc("a/SKILL.md", 100), Role::Standalone).is_empty());
    }

    #[test]
    fn longest_prefix_override_wins() {
        let mut config = with_override("suite", Some(3_000), None);
        config.overrides.insert(
            "suite/skills/big/".to_owned(),
            BudgetOverride {
                max_tokens: Some(4_000),
                max_words: Some(3_000),
                suite_ceiling: None,
                reason: "large catalog".to_owned(),
            },
        );
        let eval = BudgetEvaluator::new(&config);

        let big = eval.effective("suite/skills/big/SKILL.md", Role::Specialist);
        assert_eq!(big.limit.max_tokens, 4_000);
        assert_eq!(big.source.map(|(k, _)| k), Some("suite/skills/big/"));

        let other = eval.effective("suite/skills/small/SKILL.md", Role::Specialist);
        assert_eq!(other.limit.max_tokens, 3_000);

        let outside = eval.effective("suitely/SKILL.md", Role::Standalone);
        assert!(outside.source.is_none());
        assert_eq!(outside.limit.max_tokens, 2_000);
    }

    #[test]
    fn tightening_override_adds_style_note() {
        let config = with_override("a/SKILL.md", Some(500), None);
        let eval = BudgetEvaluator::new(&config);
        let findings = eval.evaluate(&doc("a/SKILL.md", 100), Role::Standalone);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert!(findings[0].message.contains("tightens"));
        assert!(findings[0].message.contains("documented exception"));
    }

    #[test]
    fn suite_ceiling_override() {
        let config = with_override("suite", None, Some(7_000));
        let eval = BudgetEvaluator::new(&config);
        assert_eq!(eval.suite_ceiling("suite/SKILL.md"), 7_000);
        assert_eq!(eval.suite_ceiling("other/SKILL.md"), 5_500);
        // ceiling-only overrides never change per-document targets
        assert!(eval.effective("suite/SKILL.md", Role::Coordinator).source.is_none());
    }

    #[test]
    fn report_rows() {
        let config = BudgetConfig::default();
        let eval = BudgetEvaluator::new(&config);
        let row = eval.row(&doc("s/skills/a/SKILL.md", 2_000), Role::Specialist);
        assert_eq!(row.tokens, 2_660);
        assert_eq!(row.status, BudgetStatus::Over);
        assert_eq!(row.headroom, -660);
        assert!(row.override_key.is_none());
    }
}
