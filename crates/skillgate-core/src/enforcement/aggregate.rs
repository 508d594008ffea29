//! Finding aggregation: focus filtering, ordering and the final decision.

use std::collections::BTreeSet;

use skillgate_types::document::Document;
use skillgate_types::finding::{Category, Finding};
use skillgate_types::report::{Decision, DocumentSummary, Report, ScanMode, SeverityCounts};

use crate::topology::TopologyIndex;

/// Restricts reported findings to a subset of paths.
///
/// A suite-level finding is kept when any member of the suite is in focus.
#[derive(Debug, Clone)]
pub struct Focus<'a> {
    paths: &'a BTreeSet<String>,
    index: &'a TopologyIndex,
}

impl<'a> Focus<'a> {
    pub fn new(paths: &'a BTreeSet<String>, index: &'a TopologyIndex) -> Self {
        Self { paths, index }
    }

    pub fn keeps(&self, finding: &Finding) -> bool {
        let path = finding.location.path.as_str();
        if self.paths.contains(path) {
            return true;
        }
        if finding.category != Category::ContextLoad {
            return false;
        }
        self.index
            .suites()
            .iter()
            .find(|suite| suite.root == path)
            .is_some_and(|suite| suite.members().any(|m| self.paths.contains(m)))
    }
}

/// Sort into display order and drop exact duplicates.
pub fn normalize_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        a.display_cmp(b)
            .then_with(|| a.pattern_key.cmp(&b.pattern_key))
            .then_with(|| a.justification.cmp(&b.justification))
    });
    findings.dedup();
    findings
}

/// Assemble the final report.
pub fn build_report(
    mode: ScanMode,
    findings: Vec<Finding>,
    documents: &[Document],
    index: &TopologyIndex,
    stages: Vec<String>,
) -> Report {
    let findings = normalize_findings(findings);

    let mut summaries: Vec<DocumentSummary> = documents
        .iter()
        .map(|d| DocumentSummary {
            path: d.path.clone(),
            kind: d.kind,
            role: index.role(&d.path),
            words: d.word_count,
            tokens: d.token_estimate,
        })
        .collect();
    summaries.sort_by(|a, b| a.path.cmp(&b.path));

    Report {
        mode,
        decision: Decision::from_findings(&findings),
        counts: SeverityCounts::tally(&findings),
        findings,
        documents: summaries,
        stages,
    }
}
