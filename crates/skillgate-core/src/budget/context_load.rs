//! Simultaneous context load per suite.
//!
//! The worst case for a suite is the coordinator plus its largest specialist
//! plus the largest reference any specialist may load. A standalone document
//! carries its own largest reference. Exceeding the suite ceiling is the only
//! budget-related Hard finding.

use std::collections::BTreeMap;

use skillgate_types::document::{Document, Role};
use skillgate_types::finding::{Category, Finding, Location};
use skillgate_types::report::{LoadContribution, SpecialistLoad, SuiteLoad};

use super::BudgetEvaluator;
use crate::topology::{Suite, TopologyIndex};

/// Compute the load of every suite in `index`, sorted by root path.
pub fn suite_loads(
    index: &TopologyIndex,
    documents: &[Document],
    evaluator: &BudgetEvaluator<'_>,
) -> Vec<SuiteLoad> {
    let by_path: BTreeMap<&str, &Document> =
        documents.iter().map(|d| (d.path.as_str(), d)).collect();

    index
        .suites()
        .iter()
        .filter_map(|suite| suite_load(suite, &by_path, evaluator.suite_ceiling(&suite.root)))
        .collect()
}

/// Compute the load of one suite. `None` if the root document is missing.
pub fn suite_load(
    suite: &Suite,
    documents: &BTreeMap<&str, &Document>,
    ceiling: usize,
) -> Option<SuiteLoad> {
    let root = contribution(documents, &suite.root)?;
    let largest_of = |paths: &[String]| -> Option<LoadContribution> {
        largest(paths.iter().filter_map(|p| contribution(documents, p)))
    };

    let (largest_specialist, largest_reference, specialists) = match suite.root_role {
        Role::Coordinator => {
            let specialists: Vec<SpecialistLoad> = suite
                .specialists
                .iter()
                .filter_map(|spec| {
                    let specialist = contribution(documents, spec)?;
                    let own_ref = suite
                        .references_by_specialist
                        .get(spec)
                        .and_then(|refs| largest_of(refs.as_slice()));
                    let combined = root.tokens
                        + specialist.tokens
                        + own_ref.as_ref().map_or(0, |r| r.tokens);
                    Some(SpecialistLoad {
                        specialist,
                        largest_reference: own_ref,
                        combined,
                    })
                })
                .collect();

            let largest_specialist = largest(specialists.iter().map(|s| s.specialist.clone()));
            let largest_reference = largest(
                specialists
                    .iter()
                    .filter_map(|s| s.largest_reference.clone()),
            );
            (largest_specialist, largest_reference, specialists)
        }
        _ => (None, largest_of(suite.root_references.as_slice()), Vec::new()),
    };

    let worst_case = root.tokens
        + largest_specialist.as_ref().map_or(0, |s| s.tokens)
        + largest_reference.as_ref().map_or(0, |r| r.tokens);

    Some(SuiteLoad {
        root,
        root_role: suite.root_role,
        largest_specialist,
        largest_reference,
        specialists,
        worst_case,
        ceiling,
    })
}

/// Hard `context-load` findings for every suite over its ceiling.
pub fn check_context_load(loads: &[SuiteLoad]) -> Vec<Finding> {
    loads
        .iter()
        .filter(|load| load.exceeds_ceiling())
        .map(|load| {
            let mut parts = vec![format!(
                "{} {}={}",
                load.root_role, load.root.path, load.root.tokens
            )];
            if let Some(ref s) = load.largest_specialist {
                parts.push(format!("specialist {}={}", s.path, s.tokens));
            }
            if let Some(ref r) = load.largest_reference {
                parts.push(format!("reference {}={}", r.path, r.tokens));
            }
            Finding::hard(
                Category::ContextLoad,
                Location::file(&load.root.path),
                format!(
                    "context load {} tokens exceeds the suite ceiling of {} ({}); reduce the specialist or split the largest reference",
                    load.worst_case,
                    load.ceiling,
                    parts.join(" + ")
                ),
            )
        })
        .collect()
}

fn contribution(documents: &BTreeMap<&str, &Document>, path: &str) -> Option<LoadContribution> {
    documents.get(path).map(|d| LoadContribution {
        path: d.path.clone(),
        tokens: d.token_estimate,
    })
}

/// Largest contribution; ties go to the lexicographically smallest path.
fn largest(items: impl Iterator<Item = LoadContribution>) -> Option<LoadContribution> {
    items.max_by(|a, b| a.tokens.cmp(&b.tokens).then_with(|| b.path.cmp(&a.path)))
}
