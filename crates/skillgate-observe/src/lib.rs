//! Observability setup for skillgate: structured logging to stderr.

pub mod tracing_setup;
