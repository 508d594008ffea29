//! Hygiene checks for helper scripts.

use skillgate_types::document::{Document, DocumentKind};
use skillgate_types::finding::{Category, Finding, Location};

/// Extensions whose scripts are executed directly and need a shebang.
const SHEBANG_EXTENSIONS: &[&str] = &["sh", "bash", "py", "rb", "pl"];

const SHELL_EXTENSIONS: &[&str] = &["sh", "bash"];

pub fn check_script(doc: &Document) -> Vec<Finding> {
    if doc.kind != DocumentKind::Script {
        return Vec::new();
    }

    let ext = doc
        .file_name()
        .rsplit_once('.')
        .map_or("", |(_, ext)| ext);
    let first = doc.text.lines().next().unwrap_or("");
    let shebang = first.strip_prefix("#!");
    let mut findings = Vec::new();

    if shebang.is_none() && SHEBANG_EXTENSIONS.contains(&ext) {
        findings.push(Finding::warn(
            Category::ScriptQuality,
            Location::line(&doc.path, 1),
            "missing shebang line (e.g. #!/usr/bin/env bash)",
        ));
    }

    let is_shell = SHELL_EXTENSIONS.contains(&ext)
        || shebang.is_some_and(|s| {
            let interpreter = s.trim().rsplit('/').next().unwrap_or("");
            ["sh", "bash", "env sh", "env bash"].contains(&interpreter)
        });
    if is_shell && !sets_errexit(&doc.text) {
        findings.push(Finding::warn(
            Category::ScriptQuality,
            Location::line(&doc.path, 1),
            "shell script does not enable errexit; add `set -euo pipefail` near the top",
        ));
    }

    findings
}

fn sets_errexit(text: &str) -> bool {
    text.lines().any(|line| {
        let Some(args) = line.trim().strip_prefix("set ") else {
            return false;
        };
        args.split_whitespace().any(|arg| {
            arg == "errexit" || (arg.starts_with('-') && !arg.starts_with("--") && arg.contains('e'))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::parsed;

    #[test]
    fn clean_shell_script() {
        let doc = parsed("a/scripts/run.sh", "#!/usr/bin/env bash\nset -euo pipefail\necho ok\n");
        assert!(check_script(&doc).is_empty());
    }

    #[test]
    fn missing_shebang_and_errexit() {
        let doc = parsed("a/scripts/run.sh", "echo ok\n");
        let findings = check_script(&doc);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("shebang"));
        assert!(findings[1].message.contains("errexit"));
    }

    #[test]
    fn errexit_spellings() {
        assert!(sets_errexit("set -e\n"));
        assert!(sets_errexit("  set -o errexit\n"));
        assert!(!sets_errexit("set -u\n"));
        assert!(!sets_errexit("# set -e is missing\n"));
    }

    #[test]
    fn python_needs_shebang_only() {
        let doc = parsed("a/scripts/tool.py", "#!/usr/bin/env python3\nprint('x')\n");
        assert!(check_script(&doc).is_empty());
        let doc = parsed("a/scripts/tool.js", "console.log('x')\n");
        assert!(check_script(&doc).is_empty());
    }

    #[test]
    fn extensionless_shell_by_shebang() {
        let mut doc = parsed("a/scripts/run.sh", "#!/bin/sh\necho\n");
        doc.path = "a/scripts/run".to_owned();
        let findings = check_script(&doc);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("errexit"));
    }
}
