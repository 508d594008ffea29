//! Topology classification.
//!
//! Roles are a pure function of the set of discovered paths. The index is
//! built once per scan and answers role, owner and suite queries for every
//! later check.

use std::collections::{BTreeMap, BTreeSet};

use skillgate_types::document::{Document, DocumentKind, Role};

use crate::document::REFERENCE_DIRS;
use crate::paths;

const SKILL_FILE: &str = "SKILL.md";
const SPECIALISTS_DIR: &str = "skills";

/// One coordinator (or standalone document) and everything it may load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Path of the coordinator or standalone document.
    pub root: String,
    pub root_role: Role,
    /// Specialist document paths, sorted.
    pub specialists: Vec<String>,
    /// Reference documents under each specialist's `references/` tree.
    pub references_by_specialist: BTreeMap<String, Vec<String>>,
    /// Reference documents under the root's own `references/` tree.
    pub root_references: Vec<String>,
}

impl Suite {
    /// Directory that contains the root document.
    pub fn dir(&self) -> &str {
        paths::parent(&self.root)
    }

    /// Every document path belonging to this suite.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root.as_str())
            .chain(self.specialists.iter().map(String::as_str))
            .chain(
                self.references_by_specialist
                    .values()
                    .flatten()
                    .map(String::as_str),
            )
            .chain(self.root_references.iter().map(String::as_str))
    }
}

/// Memoized roles and suites for one scan.
#[derive(Debug, Clone, Default)]
pub struct TopologyIndex {
    roles: BTreeMap<String, Role>,
    owners: BTreeMap<String, String>,
    suites: Vec<Suite>,
}

impl TopologyIndex {
    /// Classify every markdown document in `documents`.
    ///
    /// The result does not depend on the order of `documents`.
    pub fn build(documents: &[Document]) -> Self {
        let skills: BTreeSet<&str> = documents
            .iter()
            .filter(|d| d.kind == DocumentKind::Skill)
            .map(|d| d.path.as_str())
            .collect();

        let coordinators: BTreeSet<&str> = skills
            .iter()
            .copied()
            .filter(|path| {
                let dir = paths::parent(path);
                skills.iter().any(|other| specialist_parent(other) == Some(dir))
            })
            .collect();

        let mut roles = BTreeMap::new();
        for path in &skills {
            let role = if coordinators.contains(path) {
                Role::Coordinator
            } else if specialist_parent(path)
                .is_some_and(|dir| coordinators.contains(paths::join(dir, SKILL_FILE).as_str()))
            {
                Role::Specialist
            } else {
                Role::Standalone
            };
            roles.insert((*path).to_owned(), role);
        }

        let mut owners = BTreeMap::new();
        let mut owned: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for doc in documents.iter().filter(|d| d.kind == DocumentKind::Reference) {
            roles.insert(doc.path.clone(), Role::Reference);
            if let Some(owner) = reference_owner(&doc.path).filter(|o| skills.contains(o.as_str()))
            {
                owned.entry(owner.clone()).or_default().push(doc.path.clone());
                owners.insert(doc.path.clone(), owner);
            }
        }
        for refs in owned.values_mut() {
            refs.sort();
        }

        let mut suites = Vec::new();
        for (path, role) in &roles {
            if !matches!(role, Role::Coordinator | Role::Standalone) {
                continue;
            }
            let mut suite = Suite {
                root: path.clone(),
                root_role: *role,
                specialists: Vec::new(),
                references_by_specialist: BTreeMap::new(),
                root_references: owned.get(path).cloned().unwrap_or_default(),
            };
            if *role == Role::Coordinator {
                let dir = paths::parent(path);
                for (spec, spec_role) in &roles {
                    if *spec_role == Role::Specialist && specialist_parent(spec) == Some(dir) {
                        suite.specialists.push(spec.clone());
                        suite.references_by_specialist.insert(
                            spec.clone(),
                            owned.get(spec).cloned().unwrap_or_default(),
                        );
                    }
                }
            }
            suites.push(suite);
        }

        tracing::debug!(
            documents = roles.len(),
            suites = suites.len(),
            "classified topology"
        );

        Self {
            roles,
            owners,
            suites,
        }
    }

    /// Role of a markdown document; `None` for scripts and unknown paths.
    pub fn role(&self, path: &str) -> Option<Role> {
        self.roles.get(path).copied()
    }

    /// The skill document whose `references/` tree contains `path`.
    pub fn owner_of_reference(&self, path: &str) -> Option<&str> {
        self.owners.get(path).map(String::as_str)
    }

    /// Suites sorted by root path. Standalone documents form one-document suites.
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// The suite a specialist belongs to.
    pub fn suite_of_specialist(&self, path: &str) -> Option<&Suite> {
        self.suites
            .iter()
            .find(|s| s.specialists.iter().any(|spec| spec == path))
    }

    /// All classified paths with their roles, sorted by path.
    pub fn roles(&self) -> impl Iterator<Item = (&str, Role)> {
        self.roles.iter().map(|(p, r)| (p.as_str(), *r))
    }
}

/// For `D/skills/<x>/SKILL.md`, return `D`.
fn specialist_parent(path: &str) -> Option<&str> {
    let dir = path.strip_suffix(SKILL_FILE)?;
    let dir = dir.strip_suffix('/')?;
    let skills_dir = paths::parent(dir);
    let (suite_dir, last) = match skills_dir.rfind('/') {
        Some(idx) => (&skills_dir[..idx], &skills_dir[idx + 1..]),
        None => ("", skills_dir),
    };
    (last == SPECIALISTS_DIR).then_some(suite_dir)
}

/// `X/references/**/y.md` → `X/SKILL.md`, using the innermost reference dir.
fn reference_owner(path: &str) -> Option<String> {
    let components: Vec<&str> = paths::parent(path).split('/').collect();
    let idx = components
        .iter()
        .rposition(|c| REFERENCE_DIRS.contains(c))?;
    if components[idx] != "references" {
        return None;
    }
    Some(paths::join(&components[..idx].join("/"), SKILL_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;

    fn suite_tree() -> Vec<Document> {
        vec![
            doc("security/SKILL.md", 100),
            doc("security/references/overview.md", 100),
            doc("security/skills/threat/SKILL.md", 100),
            doc("security/skills/threat/references/stride.md", 100),
            doc("security/skills/threat/references/deep/dread.md", 100),
            doc("security/skills/review/SKILL.md", 100),
            doc("lint/SKILL.md", 100),
            doc("lint/references/rules.md", 100),
            doc("lint/scripts/run.sh", 100),
            doc("shared-references/owasp.md", 100),
        ]
    }

    #[test]
    fn classifies_roles() {
        let index = TopologyIndex::build(&suite_tree());
        assert_eq!(index.role("security/SKILL.md"), Some(Role::Coordinator));
        assert_eq!(index.role("security/skills/threat/SKILL.md"), Some(Role::Specialist));
        assert_eq!(index.role("security/skills/review/SKILL.md"), Some(Role::Specialist));
        assert_eq!(index.role("lint/SKILL.md"), Some(Role::Standalone));
        assert_eq!(index.role("lint/references/rules.md"), Some(Role::Reference));
        assert_eq!(index.role("shared-references/owasp.md"), Some(Role::Reference));
        assert_eq!(index.role("lint/scripts/run.sh"), None);
    }

    #[test]
    fn independent_of_order() {
        let mut docs = suite_tree();
        let forward = TopologyIndex::build(&docs);
        docs.reverse();
        let backward = TopologyIndex::build(&docs);
        assert_eq!(forward.suites(), backward.suites());
        assert!(forward.roles().eq(backward.roles()));
    }

    #[test]
    fn builds_suites() {
        let index = TopologyIndex::build(&suite_tree());
        let suites = index.suites();
        assert_eq!(suites.len(), 2);

        let lint = &suites[0];
        assert_eq!(lint.root, "lint/SKILL.md");
        assert_eq!(lint.root_role, Role::Standalone);
        assert_eq!(lint.root_references, vec!["lint/references/rules.md"]);

        let security = &suites[1];
        assert_eq!(
            security.specialists,
            vec![
                "security/skills/review/SKILL.md",
                "security/skills/threat/SKILL.md"
            ]
        );
        assert_eq!(
            security.references_by_specialist["security/skills/threat/SKILL.md"],
            vec![
                "security/skills/threat/references/deep/dread.md",
                "security/skills/threat/references/stride.md",
            ]
        );
        assert!(security.references_by_specialist["security/skills/review/SKILL.md"].is_empty());
        assert_eq!(security.root_references, vec!["security/references/overview.md"]);
        assert_eq!(security.members().count(), 6);
    }

    #[test]
    fn reference_owners() {
        let index = TopologyIndex::build(&suite_tree());
        assert_eq!(
            index.owner_of_reference("security/skills/threat/references/deep/dread.md"),
            Some("security/skills/threat/SKILL.md")
        );
        assert_eq!(index.owner_of_reference("shared-references/owasp.md"), None);
        assert_eq!(
            index
                .suite_of_specialist("security/skills/threat/SKILL.md")
                .map(|s| s.root.as_str()),
            Some("security/SKILL.md")
        );
    }

    #[test]
    fn nested_coordinator_takes_precedence() {
        let docs = vec![
            doc("top/SKILL.md", 10),
            doc("top/skills/mid/SKILL.md", 10),
            doc("top/skills/mid/skills/leaf/SKILL.md", 10),
        ];
        let index = TopologyIndex::build(&docs);
        assert_eq!(index.role("top/SKILL.md"), Some(Role::Coordinator));
        assert_eq!(index.role("top/skills/mid/SKILL.md"), Some(Role::Coordinator));
        assert_eq!(
            index.role("top/skills/mid/skills/leaf/SKILL.md"),
            Some(Role::Specialist)
        );
        // The top suite has no specialists left once `mid` is a coordinator.
        assert!(index.suites()[0].specialists.is_empty());
    }

    #[test]
    fn specialist_without_coordinator_is_standalone() {
        let docs = vec![doc("suite/skills/a/SKILL.md", 10)];
        let index = TopologyIndex::build(&docs);
        assert_eq!(index.role("suite/skills/a/SKILL.md"), Some(Role::Standalone));
    }

    #[test]
    fn root_level_suite() {
        let docs = vec![doc("SKILL.md", 10), doc("skills/a/SKILL.md", 10)];
        let index = TopologyIndex::build(&docs);
        assert_eq!(index.role("SKILL.md"), Some(Role::Coordinator));
        assert_eq!(index.role("skills/a/SKILL.md"), Some(Role::Specialist));
    }
}
