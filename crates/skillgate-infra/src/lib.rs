//! Infrastructure adapters for skillgate.
//!
//! Everything that touches the filesystem lives here: tree discovery,
//! parallel document loading, the `FsProbe` implementation of
//! `skillgate_core::probe::PathProbe`, and the policy table loaders.

pub mod config;
pub mod discovery;
pub mod fs_probe;
pub mod loader;
