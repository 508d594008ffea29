//! Tree discovery.
//!
//! Walks the scan root and picks out skill documents, reference documents
//! and scripts under `scripts/` directories. Excluded directory names are
//! pruned wherever they appear.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use walkdir::WalkDir;

use skillgate_core::document::classify_kind;
use skillgate_core::paths;
use skillgate_types::document::DocumentKind;

/// Directory names skipped by default.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    "pipeline",
    "eval-cases",
    ".github",
    "templates",
    "target",
];

const SCRIPTS_DIR: &str = "scripts";

/// A file picked up by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Root-relative, `/`-separated.
    pub path: String,
    pub abs_path: PathBuf,
    pub kind: DocumentKind,
}

/// Walk `root` and return every analyzable file, sorted by path.
pub fn discover(root: &Path, excludes: &[String]) -> anyhow::Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        bail!("scan root {} is not a directory", root.display());
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excludes.iter().any(|ex| ex == name))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = paths::to_slash(rel);
        let Some(kind) = classify_kind(&path) else {
            continue;
        };
        if kind == DocumentKind::Script && !in_scripts_dir(&path) {
            continue;
        }
        files.push(DiscoveredFile {
            path,
            abs_path: entry.path().to_path_buf(),
            kind,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(root = %root.display(), files = files.len(), "discovery complete");
    Ok(files)
}

fn in_scripts_dir(path: &str) -> bool {
    paths::parent(path).split('/').any(|c| c == SCRIPTS_DIR)
}

/// Turn command-line paths into a focus set of discovered files.
///
/// Returns `None` when no paths were given or one of them is the root
/// itself. Paths must exist and lie inside `root`.
pub fn focus_set(
    root: &Path,
    targets: &[PathBuf],
    files: &[DiscoveredFile],
) -> anyhow::Result<Option<BTreeSet<String>>> {
    if targets.is_empty() {
        return Ok(None);
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("failed to resolve scan root {}", root.display()))?;

    let mut prefixes = Vec::new();
    for target in targets {
        let abs = target
            .canonicalize()
            .with_context(|| format!("path not found: {}", target.display()))?;
        let Ok(rel) = abs.strip_prefix(&root) else {
            bail!(
                "{} is outside the scan root {}",
                target.display(),
                root.display()
            );
        };
        let rel = paths::to_slash(rel);
        if rel.is_empty() {
            return Ok(None);
        }
        prefixes.push(rel);
    }

    Ok(Some(
        files
            .iter()
            .filter(|f| prefixes.iter().any(|p| paths::has_prefix(&f.path, p)))
            .map(|f| f.path.clone())
            .collect(),
    ))
}

/// The default exclude list as owned strings.
pub fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| (*s).to_owned()).collect()
}
