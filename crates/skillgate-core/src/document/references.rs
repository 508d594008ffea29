//! Extraction of path-like strings from a document body.
//!
//! Three conventions are recognized on each line:
//! - inline code spans, markdown link targets and table cells;
//! - `read <path>` / `load <path>` imperatives;
//! - bare tokens containing `/` that end in `.md`.

use std::sync::LazyLock;

use regex::Regex;
use skillgate_types::document::ReferencedPath;

/// Extensions that mark a token as a file path.
pub const PATH_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".json", ".yaml", ".yml", ".toml", ".csv", ".sh", ".bash", ".py", ".js",
    ".ts", ".rb", ".pl",
];

static RE_INLINE_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").ok());

static RE_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\[[^\]\n]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).ok());

static RE_IMPERATIVE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:read|load)\s+`?([^\s`]+)").ok());

static RE_BARE_MD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(\[])((?:\.{1,2}/)?[A-Za-z0-9_\-.]+(?:/[A-Za-z0-9_\-.]+)+\.md)\b").ok()
});

/// Extract every referenced path from `body`, whose first line is file line
/// `first_line`.
pub fn extract_references(body: &str, first_line: usize) -> Vec<ReferencedPath> {
    let mut refs = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        let line_no = first_line + idx;
        let mut seen: Vec<String> = Vec::new();
        let mut push = |candidate: Option<String>| {
            if let Some(raw) = candidate {
                if !seen.contains(&raw) {
                    seen.push(raw);
                }
            }
        };

        if let Some(re) = RE_INLINE_CODE.as_ref() {
            for cap in re.captures_iter(line) {
                push(clean(&cap[1]).filter(|p| is_explicit_path(p)));
            }
        }
        if let Some(re) = RE_LINK.as_ref() {
            for cap in re.captures_iter(line) {
                push(clean(&cap[1]).filter(|p| looks_like_path(p)));
            }
        }
        if line.trim_start().starts_with('|') {
            for cell in line.split('|') {
                let cell = cell.trim().trim_matches('`');
                push(clean(cell).filter(|p| is_explicit_path(p)));
            }
        }
        if let Some(re) = RE_IMPERATIVE.as_ref() {
            for cap in re.captures_iter(line) {
                push(clean(&cap[1]).filter(|p| looks_like_path(p)));
            }
        }
        if let Some(re) = RE_BARE_MD.as_ref() {
            for cap in re.captures_iter(line) {
                push(clean(&cap[1]));
            }
        }

        refs.extend(seen.into_iter().map(|raw| ReferencedPath {
            line: line_no,
            raw,
        }));
    }
    refs
}

/// Strip trailing punctuation and any `#fragment`, then reject tokens that
/// cannot be repository-relative paths.
fn clean(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token.starts_with('#') || is_excluded(token) {
        return None;
    }
    let token = token.split('#').next().unwrap_or(token);
    let token = token.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"']);
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return None;
    }
    Some(token.to_owned())
}

fn is_excluded(token: &str) -> bool {
    let bytes = token.as_bytes();
    let windows_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');

    token.starts_with('/')
        || token.starts_with('~')
        || token.starts_with('\\')
        || windows_drive
        || token.contains("://")
        || token.starts_with("mailto:")
        || token.contains(['$', '{', '}', '<', '>', '%', '*'])
}

fn has_path_extension(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    PATH_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Loose test for link targets and imperatives.
fn looks_like_path(token: &str) -> bool {
    token.contains('/') || has_path_extension(token)
}

/// Strict test for code spans and table cells, which often hold non-path
/// text: a directory separator and either a file extension or a trailing `/`.
fn is_explicit_path(token: &str) -> bool {
    token.contains('/') && (has_path_extension(token) || token.ends_with('/'))
}
