use thiserror::Error;

/// Errors raised while loading or validating the persisted policy tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid budget config: {0}")]
    Invalid(String),

    #[error("invalid budget override for '{path}': {message}")]
    InvalidOverride { path: String, message: String },

    #[error("invalid suppression rule #{index}: {message}")]
    InvalidSuppression { index: usize, message: String },

    #[error("invalid glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}

/// Errors raised while splitting and parsing a document's metadata header.
///
/// These never abort a scan; the document loader turns them into
/// `frontmatter` findings for the offending file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("could not read file: {0}")]
    Read(String),

    #[error("no frontmatter found (file must start with ---)")]
    MissingFrontmatter,

    #[error("no closing --- found for frontmatter")]
    UnclosedFrontmatter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("frontmatter must be a YAML mapping")]
    NotAMapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidOverride {
            path: "skills/a/SKILL.md".to_string(),
            message: "override must carry a non-empty reason".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid budget override for 'skills/a/SKILL.md': override must carry a non-empty reason"
        );
    }

    #[test]
    fn test_document_error_display() {
        assert_eq!(
            DocumentError::UnclosedFrontmatter.to_string(),
            "no closing --- found for frontmatter"
        );
        assert!(DocumentError::InvalidYaml("bad indent".to_string())
            .to_string()
            .contains("bad indent"));
    }
}
