//! Enforcement: stage orchestration and finding aggregation.

pub mod aggregate;
pub mod engine;

pub use engine::{PolicyEngine, Stage, Workspace};
