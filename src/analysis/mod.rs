//! Traffic analysis: accumulate records, run every detector, merge into one report.

mod analyzer;
mod report;

pub use analyzer::{analyze_traffic, TrafficAnalyzer};
pub use report::{AnalysisReport, DegradedDetector};
