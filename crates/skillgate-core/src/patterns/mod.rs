//! Pattern scanning: categorized unsafe-content detectors with inline and
//! repository-wide suppression.

pub mod annotation;
pub mod detectors;
pub mod scanner;
pub mod suppression;

pub use detectors::{DetectorCategory, DetectorSet};
pub use scanner::PatternScanner;
pub use suppression::SuppressionSet;
