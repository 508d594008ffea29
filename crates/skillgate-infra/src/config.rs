//! Policy table loading.
//!
//! Reads `budgets.toml` and `suppressions.toml` (or `.json` equivalents,
//! chosen by extension) and validates them. A missing default file falls
//! back to the built-in defaults; an explicitly named file must exist.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

use skillgate_types::budget::BudgetConfig;
use skillgate_types::error::ConfigError;
use skillgate_types::suppression::SuppressionFile;

/// Directory under the scan root holding the policy tables.
pub const CONFIG_DIR: &str = ".skillgate";
pub const BUDGETS_FILE: &str = "budgets.toml";
pub const SUPPRESSIONS_FILE: &str = "suppressions.toml";

/// Where a policy table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    /// The conventional location; may be absent.
    Default(PathBuf),
    /// Named on the command line; must exist.
    Explicit(PathBuf),
}

impl ConfigPath {
    pub fn resolve(explicit: Option<PathBuf>, root: &Path, file_name: &str) -> Self {
        match explicit {
            Some(path) => Self::Explicit(path),
            None => Self::Default(root.join(CONFIG_DIR).join(file_name)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Default(path) | Self::Explicit(path) => path,
        }
    }
}

/// Load and validate the budget table.
pub fn load_budget_config(source: &ConfigPath) -> anyhow::Result<BudgetConfig> {
    let config: BudgetConfig = read_table(source, "budget config")?;
    config
        .validate()
        .with_context(|| format!("in {}", source.path().display()))?;
    tracing::debug!(
        suite_ceiling = config.suite_ceiling,
        overrides = config.overrides.len(),
        "budget config loaded"
    );
    Ok(config)
}

/// Load and validate the suppression table.
pub fn load_suppressions(source: &ConfigPath) -> anyhow::Result<SuppressionFile> {
    let file: SuppressionFile = read_table(source, "suppressions")?;
    file.validate()
        .with_context(|| format!("in {}", source.path().display()))?;
    tracing::debug!(rules = file.suppressions.len(), "suppressions loaded");
    Ok(file)
}

fn read_table<T: DeserializeOwned + Default>(source: &ConfigPath, what: &str) -> anyhow::Result<T> {
    let path = source.path();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let ConfigPath::Explicit(_) = source {
                anyhow::bail!("{what} file not found: {}", path.display());
            }
            tracing::debug!("no {what} at {}, using defaults", path.display());
            return Ok(T::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let parse_error = |message: String| ConfigError::Parse {
        path: path.display().to_string(),
        message,
    };
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
    } else {
        toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
    };
    Ok(parsed)
}
