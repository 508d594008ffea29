//! Commit subject grammar: `type(scope): description` or `type: description`.

use std::sync::LazyLock;

use regex::Regex;
use skillgate_types::finding::{Category, Finding, Location};

pub const COMMIT_TYPES: &[&str] = &[
    "build",
    "chore",
    "ci",
    "docs",
    "feat",
    "fix",
    "perf",
    "refactor",
    "revert",
    "skill",
    "skill-docs",
    "skill-eval",
    "skill-fix",
    "skill-ref",
    "style",
    "test",
];

pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_SUBJECT_CHARS: usize = 100;

static RE_SUBJECT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[a-z][a-z-]*)(?:\([^)]+\))?:\s+(?P<desc>.+)$").ok()
});

/// Validate a commit message. `source` names the message file in findings.
///
/// Lines starting with `#` are ignored. Merge commits are accepted as-is.
pub fn check_commit_message(source: &str, message: &str) -> Vec<Finding> {
    let at = Location::line(source, 1);
    let subject = message
        .lines()
        .find(|line| !line.starts_with('#'))
        .map(str::trim)
        .unwrap_or("");

    if subject.is_empty() {
        return vec![Finding::hard(Category::CommitFormat, at, "commit message is empty")];
    }
    if subject.starts_with("Merge ") {
        return Vec::new();
    }

    let Some(caps) = RE_SUBJECT.as_ref().and_then(|re| re.captures(subject)) else {
        return vec![Finding::hard(
            Category::CommitFormat,
            at,
            format!(
                "subject must match 'type(scope): description' or 'type: description' (got '{subject}'); valid types: {}",
                COMMIT_TYPES.join(", ")
            ),
        )];
    };

    let kind = &caps["type"];
    let description = &caps["desc"];
    let mut findings = Vec::new();

    if !COMMIT_TYPES.contains(&kind) {
        findings.push(Finding::hard(
            Category::CommitFormat,
            at.clone(),
            format!(
                "unknown commit type '{kind}'; valid types: {}",
                COMMIT_TYPES.join(", ")
            ),
        ));
    }

    let desc_chars = description.chars().count();
    if desc_chars < MIN_DESCRIPTION_CHARS {
        findings.push(Finding::hard(
            Category::CommitFormat,
            at.clone(),
            format!(
                "description must be at least {MIN_DESCRIPTION_CHARS} characters (got {desc_chars})"
            ),
        ));
    }

    if description.ends_with('.') {
        findings.push(Finding::hard(
            Category::CommitFormat,
            at.clone(),
            "description should not end with a period",
        ));
    }

    let subject_chars = subject.chars().count();
    if subject_chars > MAX_SUBJECT_CHARS {
        findings.push(Finding::hard(
            Category::CommitFormat,
            at,
            format!("subject line too long ({subject_chars} chars, max {MAX_SUBJECT_CHARS})"),
        ));
    }

    findings
}
