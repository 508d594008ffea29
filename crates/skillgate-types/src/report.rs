//! Scan report types: the aggregated findings and the accept/reject decision.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{DocumentKind, Role};
use crate::finding::{Finding, Severity};

/// How failures are surfaced. Neither mode changes what a check computes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Run every stage and aggregate everything (audits).
    #[default]
    Full,
    /// Stop after the first stage that produced a blocking finding.
    FailFast,
}

/// The overall verdict of a scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    /// Reject iff at least one finding is Hard and unsuppressed.
    pub fn from_findings(findings: &[Finding]) -> Self {
        if findings.iter().any(Finding::is_blocking) {
            Self::Reject
        } else {
            Self::Accept
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Accept => 0,
            Self::Reject => 1,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Finding counts per severity tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub hard: usize,
    pub warn: usize,
    pub info: usize,
    pub suppressed: usize,
}

impl SeverityCounts {
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Hard => counts.hard += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Info => counts.info += 1,
            }
            if finding.suppressed {
                counts.suppressed += 1;
            }
        }
        counts
    }
}

/// Per-document manifest entry carried in the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub path: String,
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub words: usize,
    pub tokens: usize,
}

/// The aggregated result of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub mode: ScanMode,
    pub decision: Decision,
    pub counts: SeverityCounts,
    /// Sorted in display order.
    pub findings: Vec<Finding>,
    /// Sorted by path.
    pub documents: Vec<DocumentSummary>,
    /// Stages that ran, in execution order.
    pub stages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Budget report
// ---------------------------------------------------------------------------

/// Where a document sits relative to its token target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Ok,
    /// Within 10% of the target.
    Near,
    Over,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Near => write!(f, "near"),
            Self::Over => write!(f, "over"),
        }
    }
}

/// One row of the per-document budget report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetRow {
    pub path: String,
    pub role: Role,
    pub words: usize,
    pub tokens: usize,
    pub max_words: usize,
    pub max_tokens: usize,
    pub status: BudgetStatus,
    /// Tokens left before the target; negative when over.
    pub headroom: i64,
    /// Key of the override that set the target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Context load
// ---------------------------------------------------------------------------

/// A document's contribution to a context-load computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadContribution {
    pub path: String,
    pub tokens: usize,
}

/// One specialist and the largest reference in its own reference set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecialistLoad {
    pub specialist: LoadContribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_reference: Option<LoadContribution>,
    /// coordinator + this specialist + its largest reference.
    pub combined: usize,
}

/// The simultaneous context load of one suite (or standalone document).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuiteLoad {
    pub root: LoadContribution,
    pub root_role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_specialist: Option<LoadContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_reference: Option<LoadContribution>,
    pub specialists: Vec<SpecialistLoad>,
    pub worst_case: usize,
    pub ceiling: usize,
}

impl SuiteLoad {
    pub fn exceeds_ceiling(&self) -> bool {
        self.worst_case > self.ceiling
    }
}
