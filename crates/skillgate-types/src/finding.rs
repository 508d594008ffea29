//! Finding types: the output of one check against one document or document pair.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity tier of a finding.
///
/// - `Hard`: blocks acceptance until fixed or explicitly suppressed.
/// - `Warn`: always surfaced, never blocks.
/// - `Info`: audit trail only (headroom notices, suppressed findings).
///
/// Variant order is display order: `Hard < Warn < Info`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Hard,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hard => write!(f, "HARD"),
            Self::Warn => write!(f, "WARN"),
            Self::Info => write!(f, "INFO"),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Display group of a category; checks run and print in this order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Security,
    Structural,
    Advisory,
}

/// What kind of check produced a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SensitivePath,
    InjectionPattern,
    DangerousCommand,
    EncodedPayload,
    Frontmatter,
    ReferenceExistence,
    ReferenceDepth,
    ReferenceCycle,
    Isolation,
    ContextLoad,
    Budget,
    Prose,
    ScriptQuality,
    CommitFormat,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Self::SensitivePath,
        Self::InjectionPattern,
        Self::DangerousCommand,
        Self::EncodedPayload,
        Self::Frontmatter,
        Self::ReferenceExistence,
        Self::ReferenceDepth,
        Self::ReferenceCycle,
        Self::Isolation,
        Self::ContextLoad,
        Self::Budget,
        Self::Prose,
        Self::ScriptQuality,
        Self::CommitFormat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SensitivePath => "sensitive-path",
            Self::InjectionPattern => "injection-pattern",
            Self::DangerousCommand => "dangerous-command",
            Self::EncodedPayload => "encoded-payload",
            Self::Frontmatter => "frontmatter",
            Self::ReferenceExistence => "reference-existence",
            Self::ReferenceDepth => "reference-depth",
            Self::ReferenceCycle => "reference-cycle",
            Self::Isolation => "isolation",
            Self::ContextLoad => "context-load",
            Self::Budget => "budget",
            Self::Prose => "prose",
            Self::ScriptQuality => "script-quality",
            Self::CommitFormat => "commit-format",
        }
    }

    pub fn group(self) -> CategoryGroup {
        match self {
            Self::SensitivePath
            | Self::InjectionPattern
            | Self::DangerousCommand
            | Self::EncodedPayload => CategoryGroup::Security,
            Self::Frontmatter
            | Self::ReferenceExistence
            | Self::ReferenceDepth
            | Self::ReferenceCycle
            | Self::Isolation
            | Self::ContextLoad => CategoryGroup::Structural,
            Self::Budget | Self::Prose | Self::ScriptQuality | Self::CommitFormat => {
                CategoryGroup::Advisory
            }
        }
    }

    /// Parse a category from its kebab-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Location and suppression
// ---------------------------------------------------------------------------

/// Where a finding points: a repository-relative path and an optional line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Location {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
        }
    }

    pub fn line(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => write!(f, "{}", self.path),
        }
    }
}

/// How a finding was suppressed, if at all.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionSource {
    #[default]
    None,
    InlineAnnotation,
    SuppressionFile,
}

impl fmt::Display for SuppressionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::InlineAnnotation => write!(f, "inline-annotation"),
            Self::SuppressionFile => write!(f, "suppression-file"),
        }
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// One check result against one document (or document pair).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub suppressed: bool,
    pub suppression_source: SuppressionSource,
    /// Audit text recorded when the finding was suppressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    /// Detector key (`category/name`) for pattern findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_key: Option<String>,
}

impl Finding {
    pub fn new(
        category: Category,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            location,
            message: message.into(),
            suppressed: false,
            suppression_source: SuppressionSource::None,
            justification: None,
            pattern_key: None,
        }
    }

    pub fn hard(category: Category, location: Location, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Hard, location, message)
    }

    pub fn warn(category: Category, location: Location, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Warn, location, message)
    }

    pub fn info(category: Category, location: Location, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Info, location, message)
    }

    pub fn with_pattern_key(mut self, key: impl Into<String>) -> Self {
        self.pattern_key = Some(key.into());
        self
    }

    /// Mark the finding suppressed and demote it to `Info`.
    pub fn suppress(mut self, source: SuppressionSource, justification: impl Into<String>) -> Self {
        self.suppressed = true;
        self.suppression_source = source;
        self.severity = Severity::Info;
        self.justification = Some(justification.into());
        self
    }

    /// Whether this finding blocks acceptance.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Hard && !self.suppressed
    }

    /// Total display order: severity, group, category, location, message.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| self.category.group().cmp(&other.category.group()))
            .then_with(|| self.category.cmp(&other.category))
            .then_with(|| self.location.path.cmp(&other.location.path))
            .then_with(|| self.location.line.cmp(&other.location.line))
            .then_with(|| self.message.cmp(&other.message))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.category, self.location, self.message
        )?;
        if let Some(ref justification) = self.justification {
            write!(f, " (suppressed by {}: {justification})", self.suppression_source)?;
        }
        Ok(())
    }
}
