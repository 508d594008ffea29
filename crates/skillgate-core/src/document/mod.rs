//! Document model: kind classification, header parsing, size metrics and
//! reference extraction.
//!
//! Parsing never fails. Problems with a skill's header become `frontmatter`
//! findings returned next to the document, and the scan continues.

pub mod frontmatter;
pub mod references;

use std::path::PathBuf;

use skillgate_types::document::{Document, DocumentKind, estimate_tokens};
use skillgate_types::finding::{Category, Finding, Location};

pub use frontmatter::FrontmatterRules;

use crate::paths;

/// File extensions treated as executable helpers.
pub const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bash", "py", "js", "ts", "rb", "pl"];

/// Directory names whose markdown files are reference documents.
pub const REFERENCE_DIRS: &[&str] = &["references", "shared-references"];

/// A document together with the findings produced while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Document,
    pub findings: Vec<Finding>,
}

/// Decide what kind of document lives at `path`, if any.
pub fn classify_kind(path: &str) -> Option<DocumentKind> {
    let name = path.rsplit('/').next().unwrap_or(path);
    if name == "SKILL.md" {
        return Some(DocumentKind::Skill);
    }
    if name.ends_with(".md") && in_reference_dir(path) {
        return Some(DocumentKind::Reference);
    }
    if is_script_path(path) {
        return Some(DocumentKind::Script);
    }
    None
}

/// Whether any directory component of `path` is a reference directory.
pub fn in_reference_dir(path: &str) -> bool {
    paths::parent(path)
        .split('/')
        .any(|component| REFERENCE_DIRS.contains(&component))
}

/// Whether `path` has a script extension.
pub fn is_script_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && SCRIPT_EXTENSIONS.contains(&ext))
}

/// Build a [`Document`] from file text.
pub fn parse_document(
    path: &str,
    abs_path: PathBuf,
    kind: DocumentKind,
    text: String,
    rules: &FrontmatterRules,
) -> ParsedDocument {
    let mut findings = Vec::new();
    let mut fm = None;
    let mut body_start = 0;
    let mut body_line = 1;

    match kind {
        DocumentKind::Skill => match frontmatter::split_frontmatter(&text) {
            Ok(split) => {
                body_start = split.body_start;
                body_line = split.body_line;
                match frontmatter::parse_frontmatter(split.yaml) {
                    Ok(parsed) => {
                        findings.extend(frontmatter::validate_frontmatter(
                            path, &parsed, split.yaml, rules,
                        ));
                        fm = Some(parsed);
                    }
                    Err(e) => findings.push(Finding::hard(
                        Category::Frontmatter,
                        Location::line(path, 1),
                        e.to_string(),
                    )),
                }
            }
            Err(e) => findings.push(Finding::hard(
                Category::Frontmatter,
                Location::line(path, 1),
                e.to_string(),
            )),
        },
        DocumentKind::Reference => {
            // Optional header; stripped when well-formed, otherwise left as body.
            if let Ok(split) = frontmatter::split_frontmatter(&text) {
                body_start = split.body_start;
                body_line = split.body_line;
                fm = frontmatter::parse_frontmatter(split.yaml).ok();
            }
        }
        DocumentKind::Script => {}
    }

    let body = &text[body_start..];
    let word_count = body.split_whitespace().count();
    let references = if kind.is_prose() {
        references::extract_references(body, body_line)
    } else {
        Vec::new()
    };

    tracing::trace!(path, %kind, word_count, references = references.len(), "parsed document");

    ParsedDocument {
        document: Document {
            path: path.to_owned(),
            abs_path,
            kind,
            frontmatter: fm,
            token_estimate: estimate_tokens(word_count),
            word_count,
            body_start,
            body_line_offset: body_line,
            references,
            text,
        },
        findings,
    }
}

/// The Hard finding recorded for a file that could not be read.
pub fn unreadable_finding(path: &str, error: impl std::fmt::Display) -> Finding {
    Finding::hard(
        Category::Frontmatter,
        Location::file(path),
        format!("could not read file: {error}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillgate_types::finding::Severity;

    fn parse(path: &str, kind: DocumentKind, text: &str) -> ParsedDocument {
        parse_document(
            path,
            PathBuf::from(path),
            kind,
            text.to_owned(),
            &FrontmatterRules::default(),
        )
    }

    #[test]
    fn classify_kinds() {
        assert_eq!(classify_kind("skills/a/SKILL.md"), Some(DocumentKind::Skill));
        assert_eq!(
            classify_kind("skills/a/references/x.md"),
            Some(DocumentKind::Reference)
        );
        assert_eq!(
            classify_kind("shared-references/security/owasp.md"),
            Some(DocumentKind::Reference)
        );
        assert_eq!(classify_kind("skills/a/scripts/run.sh"), Some(DocumentKind::Script));
        assert_eq!(classify_kind("README.md"), None);
        assert_eq!(classify_kind("skills/a/notes.md"), None);
        assert_eq!(classify_kind("skills/a/.sh"), None);
    }

    #[test]
    fn skill_metrics_exclude_header() {
        let text = "---\nname: demo\ndescription: one two three four five six seven eight nine ten\n---\nalpha beta\ngamma `references/a.md`\n";
        let parsed = parse("demo/SKILL.md", DocumentKind::Skill, text);
        assert!(parsed.findings.is_empty());

        let doc = parsed.document;
        assert_eq!(doc.word_count, 4);
        assert_eq!(doc.token_estimate, 5);
        assert_eq!(doc.body_line_offset, 5);
        assert_eq!(doc.body(), "alpha beta\ngamma `references/a.md`\n");
        assert_eq!(doc.references.len(), 1);
        assert_eq!(doc.references[0].line, 6);
        assert_eq!(doc.frontmatter.unwrap().name.as_deref(), Some("demo"));
    }

    #[test]
    fn skill_without_header_is_hard_not_fatal() {
        let parsed = parse("demo/SKILL.md", DocumentKind::Skill, "just words here\n");
        assert_eq!(parsed.findings.len(), 1);
        assert_eq!(parsed.findings[0].severity, Severity::Hard);
        assert_eq!(parsed.document.word_count, 3);
        assert!(parsed.document.frontmatter.is_none());
    }

    #[test]
    fn invalid_yaml_is_hard() {
        let parsed = parse(
            "demo/SKILL.md",
            DocumentKind::Skill,
            "---\nname: [oops\n---\nbody\n",
        );
        assert_eq!(parsed.findings.len(), 1);
        assert!(parsed.findings[0].message.contains("invalid YAML"));
        assert_eq!(parsed.document.body(), "body\n");
    }

    #[test]
    fn reference_header_is_optional() {
        let plain = parse("a/references/x.md", DocumentKind::Reference, "one two\n");
        assert!(plain.findings.is_empty());
        assert_eq!(plain.document.word_count, 2);

        let headed = parse(
            "a/references/x.md",
            DocumentKind::Reference,
            "---\ntitle: x\n---\none two three\n",
        );
        assert!(headed.findings.is_empty());
        assert_eq!(headed.document.word_count, 3);
    }

    #[test]
    fn scripts_have_no_references() {
        let parsed = parse(
            "a/scripts/run.sh",
            DocumentKind::Script,
            "#!/bin/sh\ncat references/a.md\n",
        );
        assert!(parsed.document.references.is_empty());
    }

    #[test]
    fn unreadable_is_hard() {
        let finding = unreadable_finding("a/SKILL.md", "stream did not contain valid UTF-8");
        assert!(finding.is_blocking());
        assert!(finding.message.contains("UTF-8"));
    }
}
