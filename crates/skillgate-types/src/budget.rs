//! Budget configuration types.
//!
//! `BudgetConfig` is the persisted `budgets.toml` table: per-role word/token
//! targets, the single hard suite ceiling, and path-keyed overrides. It is
//! loaded once per run and passed read-only into the evaluators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{Role, TOKEN_RATIO_PERCENT};
use crate::error::ConfigError;

/// Default hard ceiling on simultaneous context load, in tokens.
pub const DEFAULT_SUITE_CEILING: usize = 5_500;

/// Advisory target for one role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleBudget {
    pub max_words: usize,
    pub max_tokens: usize,
}

/// Per-role advisory targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleBudgets {
    #[serde(default = "default_coordinator")]
    pub coordinator: RoleBudget,
    #[serde(default = "default_specialist")]
    pub specialist: RoleBudget,
    #[serde(default = "default_standalone")]
    pub standalone: RoleBudget,
    #[serde(default = "default_reference")]
    pub reference: RoleBudget,
}

fn default_coordinator() -> RoleBudget {
    RoleBudget {
        max_words: 600,
        max_tokens: 800,
    }
}

fn default_specialist() -> RoleBudget {
    RoleBudget {
        max_words: 1_500,
        max_tokens: 2_000,
    }
}

fn default_standalone() -> RoleBudget {
    RoleBudget {
        max_words: 1_500,
        max_tokens: 2_000,
    }
}

fn default_reference() -> RoleBudget {
    RoleBudget {
        max_words: 1_500,
        max_tokens: 2_000,
    }
}

impl Default for RoleBudgets {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator(),
            specialist: default_specialist(),
            standalone: default_standalone(),
            reference: default_reference(),
        }
    }
}

impl RoleBudgets {
    pub fn for_role(&self, role: Role) -> RoleBudget {
        match role {
            Role::Coordinator => self.coordinator,
            Role::Specialist => self.specialist,
            Role::Standalone => self.standalone,
            Role::Reference => self.reference,
        }
    }
}

/// A documented exception to the defaults for one path (file or directory).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetOverride {
    /// Replacement token target for documents under this path.
    #[serde(default)]
    pub max_tokens: Option<usize>,
    /// Replacement word target; derived from `max_tokens` when absent.
    #[serde(default)]
    pub max_words: Option<usize>,
    /// Replacement suite ceiling when the key names a coordinator.
    #[serde(default)]
    pub suite_ceiling: Option<usize>,
    /// Why the exception exists. Required.
    pub reason: String,
}

impl BudgetOverride {
    /// The effective per-document target, if this override sets one.
    pub fn role_budget(&self) -> Option<RoleBudget> {
        let max_tokens = self.max_tokens?;
        let max_words = self
            .max_words
            .unwrap_or(max_tokens * 100 / TOKEN_RATIO_PERCENT);
        Some(RoleBudget {
            max_words,
            max_tokens,
        })
    }
}

/// The persisted budget table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetConfig {
    #[serde(default = "default_suite_ceiling")]
    pub suite_ceiling: usize,
    #[serde(default)]
    pub roles: RoleBudgets,
    #[serde(default)]
    pub overrides: BTreeMap<String, BudgetOverride>,
}

fn default_suite_ceiling() -> usize {
    DEFAULT_SUITE_CEILING
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            suite_ceiling: default_suite_ceiling(),
            roles: RoleBudgets::default(),
            overrides: BTreeMap::new(),
        }
    }
}

impl BudgetConfig {
    /// Check invariants that serde cannot express.
    ///
    /// Every override must carry a non-empty reason and set at least one
    /// ceiling; all ceilings must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suite_ceiling == 0 {
            return Err(ConfigError::Invalid(
                "suite_ceiling must be greater than zero".to_owned(),
            ));
        }

        for role in [Role::Coordinator, Role::Specialist, Role::Standalone, Role::Reference] {
            let budget = self.roles.for_role(role);
            if budget.max_tokens == 0 || budget.max_words == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{role} max_tokens and max_words must be greater than zero"
                )));
            }
        }

        for (path, over) in &self.overrides {
            if over.reason.trim().is_empty() {
                return Err(ConfigError::InvalidOverride {
                    path: path.clone(),
                    message: "override must carry a non-empty reason".to_owned(),
                });
            }
            if over.max_tokens.is_none() && over.suite_ceiling.is_none() {
                return Err(ConfigError::InvalidOverride {
                    path: path.clone(),
                    message: "override must set max_tokens or suite_ceiling".to_owned(),
                });
            }
            if over.max_tokens == Some(0) || over.suite_ceiling == Some(0) {
                return Err(ConfigError::InvalidOverride {
                    path: path.clone(),
                    message: "override ceilings must be greater than zero".to_owned(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_targets() {
        let config = BudgetConfig::default();
        assert_eq!(config.suite_ceiling, 5_500);
        assert_eq!(config.roles.for_role(Role::Coordinator).max_tokens, 800);
        assert_eq!(config.roles.for_role(Role::Specialist).max_tokens, 2_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: BudgetConfig = toml::from_str("").unwrap();
        assert_eq!(config, BudgetConfig::default());
    }

    #[test]
    fn parses_overrides() {
        let toml_str = r#"
suite_ceiling = 6000

[roles.coordinator]
max_words = 500
max_tokens = 700

[overrides."skills/threat-model/SKILL.md"]
max_tokens = 1200
reason = "threat catalog kept inline"
"#;
        let config: BudgetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.suite_ceiling, 6_000);
        assert_eq!(config.roles.coordinator.max_tokens, 700);
        // Unlisted roles keep their defaults.
        assert_eq!(config.roles.specialist.max_tokens, 2_000);

        let over = &config.overrides["skills/threat-model/SKILL.md"];
        let budget = over.role_budget().unwrap();
        assert_eq!(budget.max_tokens, 1_200);
        assert_eq!(budget.max_words, 902);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_role_ceilings() {
        let mut config = BudgetConfig::default();
        config.roles.coordinator.max_tokens = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("coordinator max_tokens"));

        let mut config = BudgetConfig::default();
        config.roles.reference.max_words = 0;
        assert!(config.validate().is_err());

        let config: BudgetConfig =
            toml::from_str("[roles.specialist]\nmax_words = 0\nmax_tokens = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_override_without_reason() {
        let mut config = BudgetConfig::default();
        config.overrides.insert(
            "skills/a/SKILL.md".to_owned(),
            BudgetOverride {
                max_tokens: Some(900),
                max_words: None,
                suite_ceiling: None,
                reason: "  ".to_owned(),
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("non-empty reason"));
    }

    #[test]
    fn rejects_override_without_ceiling() {
        let mut config = BudgetConfig::default();
        config.overrides.insert(
            "skills/a".to_owned(),
            BudgetOverride {
                max_tokens: None,
                max_words: None,
                suite_ceiling: None,
                reason: "why not".to_owned(),
            },
        );
        assert!(config.validate().is_err());
    }
}
