//! Parallel document loading.
//!
//! Reads and parses every discovered file with rayon, then pulls in scripts
//! that prose documents reference from outside `scripts/` directories.
//! A file that cannot be read becomes a finding; it never aborts the scan.

use std::path::Path;

use rayon::prelude::*;

use skillgate_core::document::{FrontmatterRules, parse_document, unreadable_finding};
use skillgate_core::enforcement::Workspace;
use skillgate_core::graph::referenced_scripts;
use skillgate_core::probe::PathProbe;
use skillgate_types::document::{Document, DocumentKind};
use skillgate_types::finding::Finding;

use crate::discovery::DiscoveredFile;

/// Load `files` (and any scripts they reference) into a [`Workspace`].
pub fn load_workspace(
    root: &Path,
    files: &[DiscoveredFile],
    rules: &FrontmatterRules,
    probe: &dyn PathProbe,
) -> Workspace {
    let (mut documents, mut load_findings) = load_all(files, rules);

    let extra: Vec<DiscoveredFile> = referenced_scripts(&documents, probe)
        .into_iter()
        .map(|path| DiscoveredFile {
            abs_path: root.join(&path),
            path,
            kind: DocumentKind::Script,
        })
        .collect();
    if !extra.is_empty() {
        tracing::debug!(scripts = extra.len(), "loading referenced scripts");
        let (scripts, findings) = load_all(&extra, rules);
        documents.extend(scripts);
        load_findings.extend(findings);
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(
        documents = documents.len(),
        load_findings = load_findings.len(),
        "workspace loaded"
    );

    Workspace {
        documents,
        load_findings,
        focus: None,
    }
}

fn load_all(files: &[DiscoveredFile], rules: &FrontmatterRules) -> (Vec<Document>, Vec<Finding>) {
    let loaded: Vec<(Option<Document>, Vec<Finding>)> =
        files.par_iter().map(|file| load_one(file, rules)).collect();

    let mut documents = Vec::with_capacity(loaded.len());
    let mut findings = Vec::new();
    for (doc, doc_findings) in loaded {
        documents.extend(doc);
        findings.extend(doc_findings);
    }
    (documents, findings)
}

fn load_one(file: &DiscoveredFile, rules: &FrontmatterRules) -> (Option<Document>, Vec<Finding>) {
    match std::fs::read_to_string(&file.abs_path) {
        Ok(text) => {
            let parsed = parse_document(&file.path, file.abs_path.clone(), file.kind, text, rules);
            (Some(parsed.document), parsed.findings)
        }
        Err(e) => {
            tracing::warn!(path = %file.path, "failed to read document: {e}");
            (None, vec![unreadable_finding(&file.path, e)])
        }
    }
}
