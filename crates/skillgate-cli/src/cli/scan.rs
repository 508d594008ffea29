//! Shared setup for commands that scan a tree: policy tables, discovery,
//! loading.

use std::path::PathBuf;

use anyhow::{Context, Result};

use skillgate_core::document::FrontmatterRules;
use skillgate_core::enforcement::{PolicyEngine, Workspace};
use skillgate_infra::config::{
    BUDGETS_FILE, ConfigPath, SUPPRESSIONS_FILE, load_budget_config, load_suppressions,
};
use skillgate_infra::discovery::{default_excludes, discover, focus_set};
use skillgate_infra::fs_probe::FsProbe;
use skillgate_infra::loader::load_workspace;

use super::ScanArgs;

/// A loaded tree ready for the engine.
pub struct Scan {
    pub root: PathBuf,
    pub engine: PolicyEngine,
    pub workspace: Workspace,
    pub probe: FsProbe,
}

/// Read the policy tables, then discover and load the tree.
pub fn prepare(args: &ScanArgs) -> Result<Scan> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("scan root not found: {}", args.root.display()))?;

    let budgets = load_budget_config(&ConfigPath::resolve(
        args.budgets.clone(),
        &root,
        BUDGETS_FILE,
    ))?;
    let suppressions = load_suppressions(&ConfigPath::resolve(
        args.suppressions.clone(),
        &root,
        SUPPRESSIONS_FILE,
    ))?;
    let engine = PolicyEngine::new(budgets, &suppressions)?;

    let excludes = if args.exclude.is_empty() {
        default_excludes()
    } else {
        args.exclude.clone()
    };
    let files = discover(&root, &excludes)?;
    let focus = focus_set(&root, &args.paths, &files)?;

    let probe = FsProbe::new(&root);
    let rules = FrontmatterRules {
        min_description_words: args.min_description_words,
    };
    let mut workspace = load_workspace(&root, &files, &rules, &probe);
    workspace.focus = focus;

    Ok(Scan {
        root,
        engine,
        workspace,
        probe,
    })
}

impl Scan {
    /// Whether `path` is inside the requested focus (always true without one).
    pub fn in_focus(&self, path: &str) -> bool {
        self.workspace
            .focus
            .as_ref()
            .is_none_or(|focus| focus.contains(path))
    }
}
