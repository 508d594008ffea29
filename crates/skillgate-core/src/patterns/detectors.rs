//! Built-in unsafe-content detectors.
//!
//! Each [`DetectorCategory`] owns its pattern table and base severity. Every
//! detector has a stable key `category/name` used by annotations and the
//! suppression file.

use regex::Regex;
use skillgate_types::document::DocumentKind;
use skillgate_types::finding::{Category, Severity};

/// The four detector categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetectorCategory {
    SensitivePath,
    InjectionPattern,
    DangerousCommand,
    EncodedPayload,
}

/// `(name, description, regex)`.
type PatternTable = &'static [(&'static str, &'static str, &'static str)];

// ── sensitive-path ────────────────────────────────────────────────────────
const SENSITIVE_PATHS: PatternTable = &[
    ("ssh-key", "SSH key material", r"\.ssh/|\bid_(?:rsa|dsa|ecdsa|ed25519)(?:\.pub)?\b"),
    ("aws-credentials", "AWS credentials file", r"\.aws/(?:credentials|config)\b"),
    (
        "gcloud-credentials",
        "Google Cloud credentials",
        r"\.config/gcloud\b|application_default_credentials\.json",
    ),
    ("azure-credentials", "Azure CLI credentials", r"\.azure/"),
    ("etc-shadow", "system password hashes", r"/etc/(?:shadow|gshadow|sudoers)\b"),
    ("etc-passwd", "system account database", r"/etc/passwd\b"),
    (
        "dotenv",
        "environment secrets file",
        r#"(?:^|[\s/`'"(])\.env(?:\.[A-Za-z0-9_-]+)?\b"#,
    ),
    ("netrc", "netrc credentials", r"\.netrc\b"),
    ("git-credentials", "git credential store", r"\.git-credentials\b"),
    ("kube-config", "Kubernetes config", r"\.kube/config\b"),
    ("package-tokens", "package registry tokens", r"\.(?:npmrc|pypirc)\b"),
    ("gnupg", "GnuPG keyring", r"\.gnupg/"),
    (
        "credential-store",
        "browser or keychain credential store",
        r"(?i)Library/Keychains|login\.keychain|\bLogin Data\b|\bkey4\.db\b|\bcookies\.sqlite\b",
    ),
];

// ── injection-pattern ─────────────────────────────────────────────────────
const INJECTION_PATTERNS: PatternTable = &[
    (
        "ignore-previous",
        "instruction override",
        r"(?i)\b(?:ignore|disregard|forget)\s+(?:all\s+|any\s+)?(?:the\s+|your\s+)?(?:previous|prior|above|earlier)\s+(?:instructions|prompts|rules|directions)",
    ),
    (
        "role-reassignment",
        "role reassignment",
        r"(?i)\byou\s+are\s+now\s+(?:a|an|the|in|no\s+longer)\b",
    ),
    (
        "reveal-system-prompt",
        "system prompt disclosure",
        r"(?i)\b(?:reveal|print|show|output|repeat|leak)\s+(?:your\s+|the\s+)?(?:system|hidden|initial)\s+prompt",
    ),
    (
        "conceal-from-user",
        "concealment from the user",
        r"(?i)\bdo\s+not\s+(?:tell|inform|alert|notify)\s+the\s+user",
    ),
    (
        "override-safety",
        "safety override",
        r"(?i)\b(?:override|bypass|disable|ignore)\s+(?:your\s+|the\s+|all\s+)?(?:safety|security)\s+(?:guidelines|rules|checks|measures|filters|restrictions)",
    ),
    (
        "chat-template-token",
        "chat template control token",
        r"<\|(?:im_start|im_end|system|user|assistant|endoftext)\|>|\[/?INST\]|<<SYS>>",
    ),
];

// ── dangerous-command ─────────────────────────────────────────────────────
const DANGEROUS_COMMANDS: PatternTable = &[
    (
        "rm-rf-root",
        "recursive delete of root or home",
        r#"\brm\s+-[a-zA-Z]*(?:rf|fr)[a-zA-Z]*\s+(?:--no-preserve-root\s+)?["'`]?(?:/\*|/|~/?|\$HOME/?)["'`]?(?:\s|;|&|$)"#,
    ),
    (
        "curl-pipe-shell",
        "remote download piped into a shell",
        r"\b(?:curl|wget)\b[^|\n]*\|\s*(?:sudo\s+)?(?:ba|z|k|da)?sh\b",
    ),
    ("chmod-777", "world-writable permissions", r"\bchmod\s+(?:-R\s+)?0?777\b"),
    ("mkfs", "filesystem format", r"\bmkfs(?:\.[a-z0-9]+)?\b"),
    (
        "dd-to-device",
        "raw write to a block device",
        r"\bdd\b[^\n]*\bof=/dev/(?:sd|hd|nvme|disk|xvd|vd|mmcblk)",
    ),
    ("fork-bomb", "fork bomb", r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"),
    (
        "eval-remote",
        "eval of remote content",
        r#"\beval\s+["']?\$\(\s*(?:curl|wget)\b"#,
    ),
    (
        "force-push",
        "forced git push",
        r"\bgit\s+push\b[^\n]*(?:\s--force\b|\s-f\b)",
    ),
];

// ── encoded-payload ───────────────────────────────────────────────────────
const ENCODED_PAYLOADS: PatternTable = &[
    ("base64-blob", "long base64 run", r"[A-Za-z0-9+/]{80,}={0,2}"),
    (
        "base64-decode",
        "base64 decoding",
        r"\bbase64\s+(?:-d|--decode|-D)\b",
    ),
    ("hex-escape-run", "hex escape run", r"(?:\\x[0-9a-fA-F]{2}){8,}"),
    (
        "char-code-decode",
        "character code decoding",
        r"\bString\.fromCharCode\s*\(|\batob\s*\(",
    ),
];

impl DetectorCategory {
    pub const ALL: [DetectorCategory; 4] = [
        Self::SensitivePath,
        Self::InjectionPattern,
        Self::DangerousCommand,
        Self::EncodedPayload,
    ];

    pub fn category(self) -> Category {
        match self {
            Self::SensitivePath => Category::SensitivePath,
            Self::InjectionPattern => Category::InjectionPattern,
            Self::DangerousCommand => Category::DangerousCommand,
            Self::EncodedPayload => Category::EncodedPayload,
        }
    }

    /// Severity of an unsuppressed match in a document of `kind`.
    pub fn base_severity(self, kind: DocumentKind) -> Severity {
        match self {
            Self::SensitivePath | Self::InjectionPattern => Severity::Hard,
            Self::DangerousCommand if kind == DocumentKind::Script => Severity::Hard,
            Self::DangerousCommand | Self::EncodedPayload => Severity::Warn,
        }
    }

    fn patterns(self) -> PatternTable {
        match self {
            Self::SensitivePath => SENSITIVE_PATHS,
            Self::InjectionPattern => INJECTION_PATTERNS,
            Self::DangerousCommand => DANGEROUS_COMMANDS,
            Self::EncodedPayload => ENCODED_PAYLOADS,
        }
    }
}

/// One compiled detector.
#[derive(Debug, Clone)]
pub struct Detector {
    pub category: DetectorCategory,
    /// `category/name`.
    pub key: String,
    pub description: &'static str,
    pub regex: Regex,
}

/// Every detector, in category order.
#[derive(Debug, Clone)]
pub struct DetectorSet {
    detectors: Vec<Detector>,
}

impl DetectorSet {
    /// Compile the built-in tables.
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut detectors = Vec::new();
        for category in DetectorCategory::ALL {
            for &(name, description, pattern) in category.patterns() {
                detectors.push(Detector {
                    category,
                    key: format!("{}/{name}", category.category()),
                    description,
                    regex: Regex::new(pattern)?,
                });
            }
        }
        Ok(Self { detectors })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detector> {
        self.detectors.iter()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
