//! Fixture builders shared by the unit tests.

use std::path::PathBuf;

use skillgate_types::document::{Document, DocumentKind, ReferencedPath, estimate_tokens};

use crate::document::{FrontmatterRules, classify_kind, parse_document};

/// A document of `words` words with no body text or references.
pub fn doc(path: &str, words: usize) -> Document {
    Document {
        path: path.to_owned(),
        abs_path: PathBuf::from(path),
        kind: classify_kind(path).unwrap_or(DocumentKind::Script),
        frontmatter: None,
        text: String::new(),
        body_start: 0,
        body_line_offset: 1,
        word_count: words,
        token_estimate: estimate_tokens(words),
        references: Vec::new(),
    }
}

/// Like [`doc`], with references `(line, raw)`.
pub fn doc_with_refs(path: &str, words: usize, refs: &[(usize, &str)]) -> Document {
    let mut d = doc(path, words);
    d.references = refs
        .iter()
        .map(|(line, raw)| ReferencedPath {
            line: *line,
            raw: (*raw).to_owned(),
        })
        .collect();
    d
}

/// Parse `text` as the document at `path`.
pub fn parsed(path: &str, text: &str) -> Document {
    let kind = classify_kind(path).unwrap_or(DocumentKind::Script);
    parse_document(
        path,
        PathBuf::from(path),
        kind,
        text.to_owned(),
        &FrontmatterRules::default(),
    )
    .document
}
