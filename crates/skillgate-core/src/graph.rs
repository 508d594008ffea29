//! Reference graph validation.
//!
//! Builds a directed graph with an edge `A -> B` for every path in `A` that
//! resolves to a discovered document `B`, then checks existence, the
//! one-level-deep rule, sibling isolation and acyclicity.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;

use skillgate_types::document::{Document, DocumentKind, Role};
use skillgate_types::finding::{Category, Finding, Location};

use crate::paths;
use crate::document::is_script_path;
use crate::probe::{EntryKind, PathProbe};
use crate::topology::TopologyIndex;

const SHARED_REFERENCES_DIR: &str = "shared-references";

/// Where a referenced path led.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A discovered document.
    Document(String),
    /// An existing file or directory that is not a scanned document.
    External(String),
    /// Nothing; carries the target computed relative to the referencing file.
    Missing(String),
}

/// A reference that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub from: String,
    pub line: usize,
    pub raw: String,
    pub target: String,
}

/// The resolved reference graph of one scan.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    graph: DiGraph<String, usize>,
    nodes: BTreeMap<String, NodeIndex>,
    kinds: BTreeMap<String, DocumentKind>,
    unresolved: Vec<Unresolved>,
}

impl ReferenceGraph {
    /// Resolve every extracted reference of `documents` against the tree.
    pub fn build(documents: &[Document], probe: &dyn PathProbe) -> Self {
        let discovered: BTreeSet<&str> = documents.iter().map(|d| d.path.as_str()).collect();
        let shared_dirs: Vec<String> = probe
            .child_dirs(SHARED_REFERENCES_DIR)
            .into_iter()
            .map(|name| paths::join(SHARED_REFERENCES_DIR, &name))
            .collect();

        let resolved: Vec<(&Document, Vec<(usize, String, Resolution)>)> = documents
            .par_iter()
            .map(|doc| {
                let targets = doc
                    .references
                    .iter()
                    .map(|r| {
                        let resolution =
                            resolve(doc.dir(), &r.raw, &discovered, &shared_dirs, probe);
                        (r.line, r.raw.clone(), resolution)
                    })
                    .collect();
                (doc, targets)
            })
            .collect();

        let mut out = Self::default();
        let mut sorted: Vec<&Document> = documents.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));
        for doc in sorted {
            out.node(&doc.path);
            out.kinds.insert(doc.path.clone(), doc.kind);
        }

        for (doc, targets) in resolved {
            for (line, raw, resolution) in targets {
                match resolution {
                    Resolution::Document(target) => {
                        if target == doc.path {
                            continue;
                        }
                        let from = out.node(&doc.path);
                        let to = out.node(&target);
                        if out.graph.find_edge(from, to).is_none() {
                            out.graph.add_edge(from, to, line);
                        }
                    }
                    Resolution::External(_) => {}
                    Resolution::Missing(target) => out.unresolved.push(Unresolved {
                        from: doc.path.clone(),
                        line,
                        raw,
                        target,
                    }),
                }
            }
        }

        tracing::debug!(
            nodes = out.graph.node_count(),
            edges = out.graph.edge_count(),
            unresolved = out.unresolved.len(),
            "built reference graph"
        );
        out
    }

    fn node(&mut self, path: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.to_owned());
        self.nodes.insert(path.to_owned(), idx);
        idx
    }

    /// Every edge as `(from, to, line)`, sorted.
    pub fn edges(&self) -> Vec<(&str, &str, usize)> {
        let mut edges: Vec<(&str, &str, usize)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    *e.weight(),
                )
            })
            .collect();
        edges.sort();
        edges
    }

    /// Outgoing edges of `path` as `(to, line)`, sorted by target.
    fn outgoing(&self, path: &str) -> Vec<(&str, usize)> {
        let Some(&idx) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut out: Vec<(&str, usize)> = self
            .graph
            .edges(idx)
            .map(|e| (self.graph[e.target()].as_str(), *e.weight()))
            .collect();
        out.sort();
        out
    }

    pub fn unresolved(&self) -> &[Unresolved] {
        &self.unresolved
    }

    /// Hard `reference-existence` for every path that resolved nowhere.
    pub fn check_existence(&self) -> Vec<Finding> {
        self.unresolved
            .iter()
            .map(|u| {
                Finding::hard(
                    Category::ReferenceExistence,
                    Location::line(&u.from, u.line),
                    format!(
                        "referenced path '{}' does not exist (expected at {})",
                        u.raw, u.target
                    ),
                )
            })
            .collect()
    }

    /// Hard `reference-depth` findings.
    ///
    /// A reference may not link to another reference, and a reference loaded
    /// from an entry point may not lead back into a skill document.
    pub fn check_depth(&self, index: &TopologyIndex) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut entries_by_reference: BTreeMap<&str, &str> = BTreeMap::new();

        for (from, to, _) in self.edges() {
            let from_entry = index.role(from).is_some_and(Role::is_entry_point);
            if from_entry && index.role(to) == Some(Role::Reference) {
                entries_by_reference.entry(to).or_insert(from);
            }
        }

        for (from, to, line) in self.edges() {
            if index.role(from) != Some(Role::Reference) {
                continue;
            }
            if index.role(to) == Some(Role::Reference) {
                findings.push(Finding::hard(
                    Category::ReferenceDepth,
                    Location::line(from, line),
                    format!(
                        "reference {from} links to another reference {to}; references must be one level deep, so link {to} from the skill instead"
                    ),
                ));
            } else if self.kinds.get(to) == Some(&DocumentKind::Skill) {
                if let Some(entry) = entries_by_reference.get(from) {
                    findings.push(Finding::hard(
                        Category::ReferenceDepth,
                        Location::line(from, line),
                        format!(
                            "reference {from} (loaded by {entry}) links to skill document {to}; references must not lead to a second hop"
                        ),
                    ));
                }
            }
        }

        findings
    }

    /// Hard `isolation` for a specialist that reaches into a sibling.
    pub fn check_isolation(&self, index: &TopologyIndex) -> Vec<Finding> {
        let mut findings = Vec::new();
        for suite in index.suites() {
            for specialist in &suite.specialists {
                for (to, line) in self.outgoing(specialist) {
                    let sibling = suite.specialists.iter().find(|other| {
                        *other != specialist
                            && (to == other.as_str() || paths::has_prefix(to, paths::parent(other)))
                    });
                    if let Some(sibling) = sibling {
                        findings.push(Finding::hard(
                            Category::Isolation,
                            Location::line(specialist, line),
                            format!(
                                "specialist {specialist} references {to}, which belongs to sibling specialist {sibling}; move shared material to the coordinator or shared-references/"
                            ),
                        ));
                    }
                }
            }
        }
        findings
    }

    /// Hard `reference-cycle` for every strongly connected component with
    /// more than one member.
    pub fn check_cycles(&self) -> Vec<Finding> {
        let mut cycles: Vec<Vec<&str>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut members: Vec<&str> =
                    scc.into_iter().map(|idx| self.graph[idx].as_str()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();

        cycles
            .into_iter()
            .map(|members| {
                let first = members[0];
                let line = self
                    .outgoing(first)
                    .into_iter()
                    .find(|(to, _)| members.contains(to))
                    .map(|(_, line)| line);
                let location = match line {
                    Some(line) => Location::line(first, line),
                    None => Location::file(first),
                };
                Finding::hard(
                    Category::ReferenceCycle,
                    location,
                    format!("reference cycle among: {}", members.join(", ")),
                )
            })
            .collect()
    }
}

/// Existing script files referenced by prose documents that are not
/// themselves among `documents`, sorted.
pub fn referenced_scripts(documents: &[Document], probe: &dyn PathProbe) -> Vec<String> {
    let discovered: BTreeSet<&str> = documents.iter().map(|d| d.path.as_str()).collect();
    let shared_dirs: Vec<String> = probe
        .child_dirs(SHARED_REFERENCES_DIR)
        .into_iter()
        .map(|name| paths::join(SHARED_REFERENCES_DIR, &name))
        .collect();

    let found: BTreeSet<String> = documents
        .iter()
        .filter(|doc| doc.kind.is_prose())
        .flat_map(|doc| doc.references.iter().map(move |r| (doc.dir(), r.raw.as_str())))
        .filter_map(|(dir, raw)| match resolve(dir, raw, &discovered, &shared_dirs, probe) {
            Resolution::External(path)
                if is_script_path(&path)
                    && !path.starts_with("..")
                    && probe.entry(&path) == Some(EntryKind::File) =>
            {
                Some(path)
            }
            _ => None,
        })
        .collect();
    found.into_iter().collect()
}

/// Resolve `raw` as written in a document under `dir`.
///
/// Candidates are tried in order: the document's directory, the scan root,
/// then every `shared-references/<x>/` directory.
pub fn resolve(
    dir: &str,
    raw: &str,
    discovered: &BTreeSet<&str>,
    shared_dirs: &[String],
    probe: &dyn PathProbe,
) -> Resolution {
    let local = paths::join(dir, raw);
    let candidates = std::iter::once(local.clone())
        .chain(std::iter::once(paths::normalize(raw)))
        .chain(shared_dirs.iter().map(|shared| paths::join(shared, raw)));

    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }
        if discovered.contains(candidate.as_str()) {
            return Resolution::Document(candidate);
        }
        if probe.entry(&candidate).is_some() {
            return Resolution::External(candidate);
        }
    }
    Resolution::Missing(local)
}
