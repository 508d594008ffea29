//! `skillgate report`: budget and context-load tables.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use skillgate_core::topology::TopologyIndex;
use skillgate_types::report::{BudgetRow, LoadContribution, SuiteLoad};

use super::ScanArgs;
use super::output::status_cell;
use super::scan::prepare;

/// Print a per-document budget table.
pub fn budget(args: &ScanArgs, json: bool) -> Result<()> {
    let scan = prepare(args)?;
    let index = TopologyIndex::build(&scan.workspace.documents);
    let rows: Vec<BudgetRow> = scan
        .engine
        .budget_rows(&scan.workspace.documents, &index)
        .into_iter()
        .filter(|row| scan.in_focus(&row.path))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("\n  No skill or reference documents found.\n");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").fg(Color::Cyan),
            Cell::new("Role"),
            Cell::new("Words"),
            Cell::new("Tokens"),
            Cell::new("Limit"),
            Cell::new("Status"),
            Cell::new("Headroom"),
        ]);

    for row in &rows {
        let limit = match &row.override_key {
            Some(_) => format!("{}*", row.max_tokens),
            None => row.max_tokens.to_string(),
        };
        table.add_row(vec![
            Cell::new(&row.path),
            Cell::new(row.role),
            Cell::new(row.words),
            Cell::new(row.tokens),
            Cell::new(limit),
            status_cell(row.status),
            Cell::new(row.headroom),
        ]);
    }

    println!();
    println!("{table}");
    if rows.iter().any(|r| r.override_key.is_some()) {
        println!("  {}", style("* limit set by an override").dim());
    }
    println!();
    Ok(())
}

/// Print the worst-case load of every suite.
pub fn context_load(args: &ScanArgs, json: bool) -> Result<()> {
    let scan = prepare(args)?;
    let index = TopologyIndex::build(&scan.workspace.documents);
    let loads: Vec<SuiteLoad> = scan
        .engine
        .suite_loads(&scan.workspace.documents, &index)
        .into_iter()
        .filter(|load| {
            scan.in_focus(&load.root.path)
                || load.specialists.iter().any(|s| scan.in_focus(&s.specialist.path))
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&loads)?);
        return Ok(());
    }

    if loads.is_empty() {
        println!("\n  No suites found.\n");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Suite").fg(Color::Cyan),
            Cell::new("Role"),
            Cell::new("Root"),
            Cell::new("Largest specialist"),
            Cell::new("Largest reference"),
            Cell::new("Worst case"),
            Cell::new("Ceiling"),
        ]);

    for load in &loads {
        let worst = if load.exceeds_ceiling() {
            Cell::new(load.worst_case).fg(Color::Red)
        } else {
            Cell::new(load.worst_case).fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&load.root.path),
            Cell::new(load.root_role),
            Cell::new(load.root.tokens),
            Cell::new(contribution(load.largest_specialist.as_ref())),
            Cell::new(contribution(load.largest_reference.as_ref())),
            worst,
            Cell::new(load.ceiling),
        ]);
    }

    println!();
    println!("{table}");

    for load in loads.iter().filter(|l| !l.specialists.is_empty()) {
        let mut detail = Table::new();
        detail
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Specialist").fg(Color::Cyan),
                Cell::new("Tokens"),
                Cell::new("Largest own reference"),
                Cell::new("Combined"),
            ]);
        for s in &load.specialists {
            let combined = if s.combined > load.ceiling {
                Cell::new(s.combined).fg(Color::Red)
            } else {
                Cell::new(s.combined)
            };
            detail.add_row(vec![
                Cell::new(&s.specialist.path),
                Cell::new(s.specialist.tokens),
                Cell::new(contribution(s.largest_reference.as_ref())),
                combined,
            ]);
        }
        println!();
        println!("  {}", style(format!("── {} ──", load.root.path)).dim());
        println!("{detail}");
    }
    println!();
    Ok(())
}

fn contribution(c: Option<&LoadContribution>) -> String {
    match c {
        Some(c) => format!("{} ({})", c.path, c.tokens),
        None => "-".to_owned(),
    }
}
