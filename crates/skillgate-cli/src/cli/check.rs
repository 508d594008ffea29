//! `skillgate check`: run every stage and print the decision.

use std::process::ExitCode;

use anyhow::Result;

use skillgate_types::report::ScanMode;

use super::ScanArgs;
use super::output::{print_decision, print_findings};
use super::scan::prepare;

pub fn check(args: &ScanArgs, fail_fast: bool, json: bool, quiet: bool) -> Result<ExitCode> {
    let scan = prepare(args)?;
    let mode = if fail_fast {
        ScanMode::FailFast
    } else {
        ScanMode::Full
    };

    let report = scan.engine.run(&scan.workspace, &scan.probe, mode);
    tracing::info!(
        root = %scan.root.display(),
        decision = %report.decision,
        findings = report.findings.len(),
        "check complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_findings(&report.findings, quiet);
        print_decision(&report);
    }

    Ok(ExitCode::from(report.decision.exit_code()))
}
