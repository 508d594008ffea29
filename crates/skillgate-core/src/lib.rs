//! Policy logic for skillgate.
//!
//! This crate holds the pure checks (document model, topology, budgets,
//! reference graph, pattern scanner, advisory checks) and the enforcement
//! engine that aggregates them. It defines the `PathProbe` port that the
//! infrastructure layer implements and never touches the filesystem itself.

pub mod advisory;
pub mod budget;
pub mod commit_msg;
pub mod document;
pub mod enforcement;
pub mod graph;
pub mod paths;
pub mod patterns;
pub mod probe;
pub mod topology;

#[cfg(test)]
pub(crate) mod testing;
