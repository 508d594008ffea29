//! `skillgate commit-msg`: commit subject grammar check.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use console::style;

use skillgate_core::commit_msg::check_commit_message;

use super::output::finding_line;

pub fn commit_msg(file: &Path, json: bool) -> Result<ExitCode> {
    let message = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read commit message {}", file.display()))?;
    let source = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("COMMIT_EDITMSG");
    let findings = check_commit_message(source, &message);

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if findings.is_empty() {
        println!("  {} commit message ok", style("✓").green());
    } else {
        for finding in &findings {
            println!("{}", finding_line(finding));
        }
    }

    Ok(if findings.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
