//! Line-by-line pattern scanning with annotation and rule-based suppression.

use skillgate_types::document::Document;
use skillgate_types::finding::{Finding, Location, SuppressionSource};

use super::annotation::find_annotation;
use super::detectors::DetectorSet;
use super::suppression::SuppressionSet;

const SNIPPET_MAX_CHARS: usize = 60;

/// Scans document and script text against every detector.
#[derive(Debug, Clone)]
pub struct PatternScanner {
    detectors: DetectorSet,
    suppressions: SuppressionSet,
}

impl PatternScanner {
    pub fn new(detectors: DetectorSet, suppressions: SuppressionSet) -> Self {
        Self {
            detectors,
            suppressions,
        }
    }

    /// Scan the full text of `doc`, header included.
    ///
    /// Emits at most one finding per (line, detector). A match covered by an
    /// inline annotation or a suppression rule is reported as suppressed Info.
    pub fn scan(&self, doc: &Document) -> Vec<Finding> {
        let lines: Vec<&str> = doc.text.lines().collect();
        let mut findings = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            for detector in self.detectors.iter() {
                let Some(found) = detector.regex.find(line) else {
                    continue;
                };

                let category = detector.category.category();
                let finding = Finding::new(
                    category,
                    detector.category.base_severity(doc.kind),
                    Location::line(&doc.path, idx + 1),
                    format!("{}: `{}`", detector.description, snippet(found.as_str())),
                )
                .with_pattern_key(&detector.key);

                let finding = if let Some(annotation) =
                    find_annotation(&lines, idx, category, &detector.key)
                {
                    finding.suppress(SuppressionSource::InlineAnnotation, annotation.justification)
                } else if let Some(rule) =
                    self.suppressions
                        .matching(category, &detector.key, &doc.path)
                {
                    finding.suppress(SuppressionSource::SuppressionFile, rule.justification())
                } else {
                    finding
                };

                findings.push(finding);
            }
        }

        if !findings.is_empty() {
            tracing::debug!(path = %doc.path, findings = findings.len(), "pattern matches");
        }
        findings
    }
}

fn snippet(matched: &str) -> String {
    let trimmed = matched.trim();
    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        trimmed.to_owned()
    } else {
        let head: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{head}...")
    }
}
