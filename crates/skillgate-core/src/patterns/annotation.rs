//! Inline `skillgate:allow` annotations.
//!
//! Supports:
//! - `skillgate:allow <justification>` (any detector)
//! - `skillgate:allow(<category-or-key>) <justification>`
//!
//! The marker may sit inside any comment syntax (`<!-- -->`, `#`, `//`,
//! `/* */`). A trailing comment closer is not part of the justification.

use skillgate_types::finding::Category;

const MARKER: &str = "skillgate:allow";

/// How far (in lines) an annotation may sit from the match it covers.
pub const ANNOTATION_RADIUS: usize = 2;

/// A parsed annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Category name or detector key the annotation is limited to.
    pub scope: Option<String>,
    pub justification: String,
}

impl Annotation {
    /// Whether this annotation covers a match of `key` in `category`.
    pub fn covers(&self, category: Category, key: &str) -> bool {
        match self.scope.as_deref() {
            None => true,
            Some(scope) => scope == category.as_str() || scope == key,
        }
    }
}

/// Parse the annotation on `line`, if any. An annotation without a
/// justification is not an annotation.
pub fn parse_annotation(line: &str) -> Option<Annotation> {
    let pos = line.find(MARKER)?;
    let mut rest = &line[pos + MARKER.len()..];

    let mut scope = None;
    if let Some(inner) = rest.strip_prefix('(') {
        let close = inner.find(')')?;
        scope = Some(inner[..close].trim().to_owned());
        rest = &inner[close + 1..];
    } else if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        // `skillgate:allowed` and similar are not the marker
        return None;
    }

    let justification = rest
        .trim()
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .trim();
    if justification.is_empty() {
        return None;
    }

    Some(Annotation {
        scope,
        justification: justification.to_owned(),
    })
}

/// Find an annotation covering a match on `lines[idx]`.
///
/// Lines are searched nearest first: the matched line, then one above, one
/// below, two above, two below.
pub fn find_annotation(
    lines: &[&str],
    idx: usize,
    category: Category,
    key: &str,
) -> Option<Annotation> {
    let mut order = vec![idx];
    for distance in 1..=ANNOTATION_RADIUS {
        if let Some(above) = idx.checked_sub(distance) {
            order.push(above);
        }
        order.push(idx + distance);
    }

    order
        .into_iter()
        .filter_map(|i| lines.get(i))
        .filter_map(|line| parse_annotation(line))
        .find(|annotation| annotation.covers(category, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_scoped() {
        assert_eq!(
            parse_annotation("<!-- skillgate:allow documented example -->"),
            Some(Annotation {
                scope: None,
                justification: "documented example".to_owned(),
            })
        );
        assert_eq!(
            parse_annotation("# skillgate:allow(sensitive-path/ssh-key) audit fixture"),
            Some(Annotation {
                scope: Some("sensitive-path/ssh-key".to_owned()),
                justification: "audit fixture".to_owned(),
            })
        );
        assert_eq!(
            parse_annotation("/* skillgate:allow(dangerous-command) cleanup step */")
                .map(|a| a.justification),
            Some("cleanup step".to_owned())
        );
    }

    #[test]
    fn requires_justification() {
        assert_eq!(parse_annotation("<!-- skillgate:allow -->"), None);
        assert_eq!(parse_annotation("# skillgate:allow(sensitive-path)"), None);
        assert_eq!(parse_annotation("skillgate:allowed reason"), None);
        assert_eq!(parse_annotation("no marker here"), None);
    }

    #[test]
    fn scope_must_match() {
        let scoped = parse_annotation("skillgate:allow(encoded-payload) test vector").unwrap();
        assert!(scoped.covers(Category::EncodedPayload, "encoded-payload/base64-blob"));
        assert!(!scoped.covers(Category::SensitivePath, "sensitive-path/dotenv"));

        let keyed = parse_annotation("skillgate:allow(sensitive-path/dotenv) sample").unwrap();
        assert!(keyed.covers(Category::SensitivePath, "sensitive-path/dotenv"));
        assert!(!keyed.covers(Category::SensitivePath, "sensitive-path/netrc"));
    }

    #[test]
    fn search_window_is_two_lines() {
        let lines = vec![
            "<!-- skillgate:allow far away -->",
            "filler",
            "filler",
            "match",
            "filler",
            "# skillgate:allow below",
        ];
        // line 5 is two below the match at 3
        let found = find_annotation(&lines, 3, Category::SensitivePath, "sensitive-path/x");
        assert_eq!(found.map(|a| a.justification), Some("below".to_owned()));

        // line 0 is three above the match
        let lines = &lines[..5];
        assert_eq!(
            find_annotation(lines, 3, Category::SensitivePath, "sensitive-path/x"),
            None
        );
    }

    #[test]
    fn nearest_annotation_wins() {
        let lines = vec!["# skillgate:allow above", "match # skillgate:allow same line"];
        let found = find_annotation(&lines, 1, Category::InjectionPattern, "injection-pattern/x");
        assert_eq!(found.map(|a| a.justification), Some("same line".to_owned()));
    }
}
