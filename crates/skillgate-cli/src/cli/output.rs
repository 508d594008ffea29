//! Styled terminal output for findings and decisions.

use comfy_table::{Cell, Color};
use console::{StyledObject, style};

use skillgate_types::finding::{Finding, Severity};
use skillgate_types::report::{BudgetStatus, Decision, Report, SeverityCounts};

pub fn severity_label(severity: Severity) -> StyledObject<String> {
    let label = severity.to_string();
    match severity {
        Severity::Hard => style(label).red().bold(),
        Severity::Warn => style(label).yellow(),
        Severity::Info => style(label).dim(),
    }
}

/// One finding on one line: `SEV  path:line  [category] message`.
pub fn finding_line(finding: &Finding) -> String {
    let mut line = format!(
        "  {}  {}  {} {}",
        severity_label(finding.severity),
        style(&finding.location).cyan(),
        style(format!("[{}]", finding.category)).dim(),
        finding.message
    );
    if let Some(justification) = &finding.justification {
        line.push_str(&format!(
            " {}",
            style(format!("(suppressed via {}: {justification})", finding.suppression_source)).dim()
        ));
    }
    line
}

/// Print findings grouped by severity, Hard first.
///
/// With `quiet`, only Hard findings are printed.
pub fn print_findings(findings: &[Finding], quiet: bool) {
    for severity in [Severity::Hard, Severity::Warn, Severity::Info] {
        if quiet && severity != Severity::Hard {
            continue;
        }
        let group: Vec<&Finding> = findings.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!();
        println!("  {}", style(format!("── {severity} ({}) ──", group.len())).dim());
        for finding in group {
            println!("{}", finding_line(finding));
        }
    }
}

fn counts_summary(counts: &SeverityCounts) -> String {
    format!(
        "{} hard, {} warn, {} info, {} suppressed",
        counts.hard, counts.warn, counts.info, counts.suppressed
    )
}

pub fn print_decision(report: &Report) {
    println!();
    match report.decision {
        Decision::Accept => println!(
            "  {} {} ({} documents; {})",
            style("✓").green(),
            style("accept").green().bold(),
            report.documents.len(),
            counts_summary(&report.counts)
        ),
        Decision::Reject => println!(
            "  {} {} ({} documents; {})",
            style("✗").red(),
            style("reject").red().bold(),
            report.documents.len(),
            counts_summary(&report.counts)
        ),
    }
    println!();
}

pub fn status_cell(status: BudgetStatus) -> Cell {
    let color = match status {
        BudgetStatus::Ok => Color::Green,
        BudgetStatus::Near => Color::Yellow,
        BudgetStatus::Over => Color::Red,
    };
    Cell::new(status).fg(color)
}
