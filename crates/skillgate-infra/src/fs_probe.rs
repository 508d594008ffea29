//! Filesystem-backed [`PathProbe`].

use std::path::{Path, PathBuf};

use skillgate_core::probe::{EntryKind, PathProbe};

/// Answers existence queries against the real tree under `root`.
#[derive(Debug, Clone)]
pub struct FsProbe {
    root: PathBuf,
}

impl FsProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

impl PathProbe for FsProbe {
    fn entry(&self, rel: &str) -> Option<EntryKind> {
        let meta = std::fs::metadata(self.abs(rel)).ok()?;
        Some(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    fn child_dirs(&self, rel: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.abs(rel)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|e| e.file_name().to_str().map(str::to_owned))
            .collect();
        names.sort();
        names
    }
}
