//! Descriptive pattern analysis over a time window.

pub mod analyzer;
pub mod cycle;
pub mod cyclical;
pub mod frequency;
pub mod report;
pub mod sequence;
pub mod timing;

pub use analyzer::PatternAnalyzer;
pub use cycle::*;
pub use report::*;
