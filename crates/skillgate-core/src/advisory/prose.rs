//! Prose checks for skill documents.
//!
//! Procedure sections (a `## ...Procedure...` heading up to the next `##`)
//! should be written as direct imperatives; long inline checklists belong in
//! a reference file. An output format needs one example, not an example
//! plus a schema restating it. Fenced code blocks are never checked.

use std::sync::LazyLock;

use regex::Regex;
use skillgate_types::document::{Document, DocumentKind};
use skillgate_types::finding::{Category, Finding, Location};

/// Lists with more items than this draw a warning.
pub const MAX_INLINE_LIST_ITEMS: usize = 10;

/// `(phrase, rewrite hint)`.
const PROHIBITED_PHRASES: &[(&str, &str)] = &[
    ("it is important to", "state the action directly"),
    ("it's important to", "state the action directly"),
    ("you should", "use the imperative: do X"),
    ("you may want to", "use the imperative: do X"),
    ("you might want to", "use the imperative: do X"),
    ("this is because", "remove or convert to a Note:"),
    ("the reason for this", "remove or convert to a Note:"),
    ("basically", "remove filler"),
    ("essentially", "remove filler"),
    ("fundamentally", "remove filler"),
    ("in other words", "remove filler"),
    ("in order to", "replace with 'to'"),
    ("keep in mind", "inline as a Note: or remove"),
    ("please note that", "inline as a Note: or remove"),
    ("let's", "use the imperative"),
    ("we can", "use the imperative"),
    ("we should", "use the imperative"),
    ("feel free to", "use the imperative"),
    ("don't hesitate to", "use the imperative"),
];

static PHRASE_REGEXES: LazyLock<Vec<(&'static str, &'static str, Regex)>> = LazyLock::new(|| {
    PROHIBITED_PHRASES
        .iter()
        .filter_map(|&(phrase, hint)| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                .ok()
                .map(|re| (phrase, hint, re))
        })
        .collect()
});

static RE_LIST_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\S").ok());

const OUTPUT_HEADING_WORDS: &[&str] = &["output", "response", "result"];
const SCHEMA_WORDS: &[&str] = &["schema", "structure", "fields"];
const EXAMPLE_WORDS: &[&str] = &["example", "sample"];

/// Run every prose check on a skill document.
pub fn check_prose(doc: &Document) -> Vec<Finding> {
    if doc.kind != DocumentKind::Skill {
        return Vec::new();
    }
    let mut findings = check_procedure_phrasing(doc);
    findings.extend(check_inline_lists(doc));
    findings.extend(check_output_duplication(doc));
    findings
}

/// Body lines outside fenced code, with their 1-based file line numbers.
fn prose_lines(doc: &Document) -> Vec<(usize, &str)> {
    let mut in_fence = false;
    let mut out = Vec::new();
    for (idx, line) in doc.body().lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            out.push((doc.body_line_offset + idx, line));
        }
    }
    out
}

fn section_heading(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("##")?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim().to_lowercase())
}

/// Warn on filler and hedging inside procedure sections.
pub fn check_procedure_phrasing(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut in_procedure = false;

    for (line_no, line) in prose_lines(doc) {
        if let Some(heading) = section_heading(line) {
            in_procedure = heading.contains("procedure");
            continue;
        }
        if !in_procedure {
            continue;
        }
        for (phrase, hint, re) in PHRASE_REGEXES.iter() {
            if re.is_match(line) {
                findings.push(Finding::warn(
                    Category::Prose,
                    Location::line(&doc.path, line_no),
                    format!("procedure uses '{phrase}'; {hint}"),
                ));
            }
        }
    }
    findings
}

/// Warn on runs of more than [`MAX_INLINE_LIST_ITEMS`] consecutive list items.
pub fn check_inline_lists(doc: &Document) -> Vec<Finding> {
    let Some(item_re) = RE_LIST_ITEM.as_ref() else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    let mut run_start = 0;
    let mut run_len = 0;
    let flush = |start: usize, len: usize, findings: &mut Vec<Finding>| {
        if len > MAX_INLINE_LIST_ITEMS {
            findings.push(Finding::warn(
                Category::Prose,
                Location::line(&doc.path, start),
                format!(
                    "inline list of {len} items (maximum {MAX_INLINE_LIST_ITEMS}); extract it to a reference file"
                ),
            ));
        }
    };

    let mut previous_line = 0;
    for (line_no, line) in prose_lines(doc) {
        let contiguous = line_no == previous_line + 1;
        previous_line = line_no;
        if item_re.is_match(line) {
            if run_len > 0 && contiguous {
                run_len += 1;
            } else {
                flush(run_start, run_len, &mut findings);
                run_start = line_no;
                run_len = 1;
            }
        } else {
            flush(run_start, run_len, &mut findings);
            run_len = 0;
        }
    }
    flush(run_start, run_len, &mut findings);
    findings
}

/// Markdown heading level and lowercased text, for `#`-prefixed lines.
fn heading(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    let rest = &trimmed[level..];
    (level > 0 && rest.starts_with(char::is_whitespace)).then(|| (level, rest.trim().to_lowercase()))
}

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Warn when an output section both describes a schema and shows an example.
///
/// An output section starts at any heading naming output, response or
/// result, and runs until the next top-level heading. Each section is
/// reported at most once, on the line where the second half appears.
pub fn check_output_duplication(doc: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut in_output = false;
    let mut has_schema = false;
    let mut has_example = false;

    for (line_no, line) in prose_lines(doc) {
        let heading = heading(line);
        if heading
            .as_ref()
            .is_some_and(|(_, text)| mentions(text, OUTPUT_HEADING_WORDS))
        {
            in_output = true;
            has_schema = false;
            has_example = false;
            continue;
        }
        if !in_output {
            continue;
        }
        if matches!(heading, Some((1, _))) {
            in_output = false;
            continue;
        }

        let lower = line.to_lowercase();
        has_schema |= mentions(&lower, SCHEMA_WORDS);
        has_example |= mentions(&lower, EXAMPLE_WORDS);
        if has_schema && has_example {
            findings.push(Finding::warn(
                Category::Prose,
                Location::line(&doc.path, line_no),
                "output format has both a schema description and an example; keep only the example",
            ));
            in_output = false;
        }
    }
    findings
}
