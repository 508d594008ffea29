//! PathProbe trait for abstracting existence checks.
//!
//! Defined in skillgate-core so the reference graph can be validated without
//! depending on the real filesystem. The `FsProbe` adapter lives in
//! skillgate-infra.

/// What a path points to, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Read-only view of the scanned tree.
///
/// All paths are relative to the scan root, `/`-separated and lexically
/// normalized (they may start with `..` when a reference escapes the root).
pub trait PathProbe: Send + Sync {
    /// Return what lives at `rel`, or `None` if nothing does.
    fn entry(&self, rel: &str) -> Option<EntryKind>;

    /// Names of the immediate subdirectories of `rel`, sorted.
    fn child_dirs(&self, rel: &str) -> Vec<String>;
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeSet;

    use super::{EntryKind, PathProbe};

    /// In-memory probe built from a list of file paths.
    #[derive(Debug, Default)]
    pub struct MemoryProbe {
        files: BTreeSet<String>,
        dirs: BTreeSet<String>,
    }

    impl MemoryProbe {
        pub fn new<'a>(files: impl IntoIterator<Item = &'a str>) -> Self {
            let mut probe = Self::default();
            for file in files {
                probe.add_file(file);
            }
            probe
        }

        pub fn add_file(&mut self, file: &str) {
            let mut dir = file;
            while let Some(idx) = dir.rfind('/') {
                dir = &dir[..idx];
                self.dirs.insert(dir.to_owned());
            }
            self.files.insert(file.to_owned());
        }
    }

    impl PathProbe for MemoryProbe {
        fn entry(&self, rel: &str) -> Option<EntryKind> {
            let rel = rel.trim_end_matches('/');
            if self.files.contains(rel) {
                Some(EntryKind::File)
            } else if self.dirs.contains(rel) || rel.is_empty() {
                Some(EntryKind::Dir)
            } else {
                None
            }
        }

        fn child_dirs(&self, rel: &str) -> Vec<String> {
            let prefix = format!("{}/", rel.trim_end_matches('/'));
            self.dirs
                .iter()
                .filter_map(|d| d.strip_prefix(&prefix))
                .filter(|rest| !rest.contains('/'))
                .map(str::to_owned)
                .collect()
        }
    }
}
