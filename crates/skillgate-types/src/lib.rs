//! Shared domain types for skillgate.
//!
//! Documents, topology roles, findings, the two persisted policy tables
//! (budgets and suppressions), scan reports, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_yaml_ng, toml,
//! chrono, thiserror.

pub mod budget;
pub mod document;
pub mod error;
pub mod finding;
pub mod report;
pub mod suppression;
