//! Document domain types.
//!
//! A [`Document`] is an immutable snapshot of one file taken at scan time:
//! its parsed frontmatter, size metrics, and the reference strings extracted
//! from its body. The topological [`Role`] is derived from path structure and
//! is never stored on the document itself.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Words-to-tokens ratio expressed in hundredths (1.33).
pub const TOKEN_RATIO_PERCENT: usize = 133;

/// Estimate the token cost of `words` words: `round(words * 1.33)`.
///
/// Integer arithmetic keeps the result exact (half rounds up).
pub fn estimate_tokens(words: usize) -> usize {
    (words * TOKEN_RATIO_PERCENT + 50) / 100
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// What kind of file a document is, decided from its file name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A `SKILL.md` instruction document.
    Skill,
    /// A markdown file under a `references/` or `shared-references/` directory.
    Reference,
    /// An executable helper (shell, python, ...) shipped with a skill.
    Script,
}

impl DocumentKind {
    /// Whether the document is markdown prose (as opposed to a script).
    pub fn is_prose(self) -> bool {
        matches!(self, Self::Skill | Self::Reference)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill => write!(f, "skill"),
            Self::Reference => write!(f, "reference"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// The four mutually exclusive topological roles a markdown document can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coordinator,
    Specialist,
    Reference,
    Standalone,
}

impl Role {
    /// Coordinators, specialists and standalones are loaded directly by the
    /// agent; references are only reached through one of them.
    pub fn is_entry_point(self) -> bool {
        !matches!(self, Self::Reference)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinator => write!(f, "coordinator"),
            Self::Specialist => write!(f, "specialist"),
            Self::Reference => write!(f, "reference"),
            Self::Standalone => write!(f, "standalone"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// Parsed YAML frontmatter of a document.
///
/// Every field is optional at the type level so that a header with missing
/// keys still parses; the frontmatter checker turns absences into findings.
/// Keys that are not recognized land in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Frontmatter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form; YAML may type `1.0` as a number.
    #[serde(default)]
    pub version: Option<serde_yaml_ng::Value>,
    /// Model preference block (`preferred`, `minimum`, `reasoning_demand`).
    #[serde(default)]
    pub model: Option<serde_yaml_ng::Value>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub compatibility: Option<String>,
    #[serde(default, rename = "allowed-tools")]
    pub allowed_tools: Option<serde_yaml_ng::Value>,
    #[serde(default)]
    pub metadata: Option<serde_yaml_ng::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A path-like string found in a document body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferencedPath {
    /// 1-based line in the file (not the body).
    pub line: usize,
    /// The literal path as written, minus trailing punctuation and fragment.
    pub raw: String,
}

/// An immutable snapshot of one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    pub abs_path: PathBuf,
    pub kind: DocumentKind,
    pub frontmatter: Option<Frontmatter>,
    /// Full file text, header included.
    pub text: String,
    /// Byte offset in `text` where the body starts.
    pub body_start: usize,
    /// 1-based file line on which the body starts.
    pub body_line_offset: usize,
    pub word_count: usize,
    pub token_estimate: usize,
    pub references: Vec<ReferencedPath>,
}

impl Document {
    /// The body text, i.e. everything after the frontmatter block.
    pub fn body(&self) -> &str {
        &self.text[self.body_start..]
    }

    /// Directory part of `path` (empty string for root-level files).
    pub fn dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_rounds_half_up() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(1), 1);
        assert_eq!(estimate_tokens(650), 865);
        assert_eq!(estimate_tokens(600), 798);
        assert_eq!(estimate_tokens(1500), 1995);
    }

    #[test]
    fn token_estimate_matches_float_rounding() {
        for words in (0..5000).step_by(7) {
            let expected = (words as f64 * 1.33).round() as usize;
            assert_eq!(estimate_tokens(words), expected, "words={words}");
        }
    }

    #[test]
    fn role_entry_points() {
        assert!(Role::Coordinator.is_entry_point());
        assert!(Role::Specialist.is_entry_point());
        assert!(Role::Standalone.is_entry_point());
        assert!(!Role::Reference.is_entry_point());
    }

    #[test]
    fn frontmatter_collects_unknown_keys() {
        let yaml = "name: demo\ndescription: a demo skill\ncolor: blue\n";
        let fm: Frontmatter = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(fm.name.as_deref(), Some("demo"));
        assert!(fm.extra.contains_key("color"));
        assert!(!fm.extra.contains_key("name"));
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(Role::Coordinator.to_string(), "coordinator");
        assert_eq!(DocumentKind::Script.to_string(), "script");
    }
}
