//! Frontmatter splitting, parsing and validation.
//!
//! A header is a YAML mapping between a first line `---` and the next line
//! that is exactly `---`. Lines are compared after trimming trailing
//! whitespace so CRLF files behave the same as LF files.

use skillgate_types::document::Frontmatter;
use skillgate_types::error::DocumentError;
use skillgate_types::finding::{Category, Finding, Location};

/// Names that may not appear anywhere inside a skill name.
pub const RESERVED_NAME_WORDS: &[&str] = &["anthropic", "claude"];

/// Accepted values for `model.preferred` and `model.minimum`.
pub const MODEL_TIERS: &[&str] = &["haiku", "sonnet", "opus"];

/// Accepted values for `model.reasoning_demand`.
pub const REASONING_DEMANDS: &[&str] = &["low", "medium", "high"];

const KNOWN_KEYS: &[&str] = &[
    "name",
    "description",
    "version",
    "model",
    "license",
    "compatibility",
    "allowed-tools",
    "metadata",
];

const MAX_NAME_LEN: usize = 64;

/// Tunables for the frontmatter checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterRules {
    /// Descriptions shorter than this many words draw a warning.
    pub min_description_words: usize,
}

impl Default for FrontmatterRules {
    fn default() -> Self {
        Self {
            min_description_words: 10,
        }
    }
}

/// The raw header of a document and where its body begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSplit<'a> {
    pub yaml: &'a str,
    /// Byte offset of the first body byte.
    pub body_start: usize,
    /// 1-based file line of the first body line.
    pub body_line: usize,
}

/// Locate the `---` delimited header at the top of `text`.
pub fn split_frontmatter(text: &str) -> Result<HeaderSplit<'_>, DocumentError> {
    let mut lines = text.split_inclusive('\n');

    let first = lines.next().ok_or(DocumentError::MissingFrontmatter)?;
    if first.trim_end() != "---" {
        return Err(DocumentError::MissingFrontmatter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for (idx, line) in lines.enumerate() {
        if line.trim_end() == "---" {
            return Ok(HeaderSplit {
                yaml: &text[yaml_start..offset],
                body_start: offset + line.len(),
                // opening marker is line 1, this closing marker is idx + 2
                body_line: idx + 3,
            });
        }
        offset += line.len();
    }

    Err(DocumentError::UnclosedFrontmatter)
}

/// Parse a header into a [`Frontmatter`]. The header must be a YAML mapping.
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, DocumentError> {
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| DocumentError::InvalidYaml(e.to_string()))?;

    if !value.is_mapping() {
        return Err(DocumentError::NotAMapping);
    }

    serde_yaml_ng::from_value(value).map_err(|e| DocumentError::InvalidYaml(e.to_string()))
}

/// Validate a parsed skill header.
///
/// `yaml` is the raw header text, used only to point findings at the line
/// where the offending key is written.
pub fn validate_frontmatter(
    path: &str,
    fm: &Frontmatter,
    yaml: &str,
    rules: &FrontmatterRules,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let at = |key: &str| Location::line(path, key_line(yaml, key));

    // name
    match fm.name.as_deref().map(str::trim) {
        None | Some("") => findings.push(Finding::hard(
            Category::Frontmatter,
            Location::line(path, 1),
            "missing required field 'name'",
        )),
        Some(name) => {
            if let Some(problem) = name_problem(name) {
                findings.push(Finding::hard(Category::Frontmatter, at("name"), problem));
            }
        }
    }

    // description
    match fm.description.as_deref().map(str::trim) {
        None | Some("") => findings.push(Finding::hard(
            Category::Frontmatter,
            Location::line(path, 1),
            "missing required field 'description'",
        )),
        Some(description) => {
            let words = description.split_whitespace().count();
            if words < rules.min_description_words {
                findings.push(Finding::warn(
                    Category::Frontmatter,
                    at("description"),
                    format!(
                        "description is {words} words (minimum {}); say what the skill does and when to use it",
                        rules.min_description_words
                    ),
                ));
            }
        }
    }

    if let Some(ref model) = fm.model {
        findings.extend(validate_model(model, at("model")));
    }

    for key in fm.extra.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            findings.push(Finding::info(
                Category::Frontmatter,
                at(key),
                format!("unknown frontmatter field '{key}'"),
            ));
        }
    }

    findings
}

/// Describe what is wrong with a skill name, if anything.
fn name_problem(name: &str) -> Option<String> {
    if name.len() > MAX_NAME_LEN {
        return Some(format!(
            "name '{name}' is {} characters (maximum {MAX_NAME_LEN})",
            name.len()
        ));
    }

    let is_valid_slug = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !is_valid_slug {
        return Some(format!(
            "name '{name}' must contain only lowercase letters, digits, and hyphens"
        ));
    }

    RESERVED_NAME_WORDS
        .iter()
        .find(|word| name.contains(*word))
        .map(|word| format!("name '{name}' contains reserved word '{word}'"))
}

fn validate_model(model: &serde_yaml_ng::Value, location: Location) -> Vec<Finding> {
    let Some(mapping) = model.as_mapping() else {
        return vec![Finding::warn(
            Category::Frontmatter,
            location,
            "'model' should be a mapping with preferred, minimum and reasoning_demand",
        )];
    };

    let checks: [(&str, &[&str]); 3] = [
        ("preferred", MODEL_TIERS),
        ("minimum", MODEL_TIERS),
        ("reasoning_demand", REASONING_DEMANDS),
    ];

    let mut findings = Vec::new();
    for (key, allowed) in checks {
        let Some(value) = mapping.get(key) else {
            continue;
        };
        if !value.as_str().is_some_and(|v| allowed.contains(&v)) {
            findings.push(Finding::hard(
                Category::Frontmatter,
                location.clone(),
                format!(
                    "'model.{key}' must be one of {} (got {})",
                    allowed.join(", "),
                    describe_value(value)
                ),
            ));
        }
    }
    findings
}

fn describe_value(value: &serde_yaml_ng::Value) -> String {
    match value {
        serde_yaml_ng::Value::String(s) => format!("'{s}'"),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim().to_owned())
            .unwrap_or_else(|_| "an unsupported value".to_owned()),
    }
}

/// 1-based file line on which a top-level `key:` is written (header line 2
/// onward), or line 1 when the key cannot be found.
fn key_line(yaml: &str, key: &str) -> usize {
    yaml.lines()
        .position(|line| {
            line.strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
        .map_or(1, |idx| idx + 2)
}
