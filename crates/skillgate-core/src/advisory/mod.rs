//! Advisory checks. Everything here is Warn at most and never blocks.

pub mod prose;
pub mod script_quality;

pub use prose::check_prose;
pub use script_quality::check_script;
