//! Jeopardy Stats - exploratory analysis of a trivia question dataset
//!
//! Normalizes question text, derives per-row features and compares term
//! usage between high and low value questions with a chi-squared test.

pub mod config;
pub mod data;
pub mod stats;

pub use config::AnalysisConfig;
pub use data::{DataLoader, DataProcessor, ProcessedTable, Table};
pub use stats::{AnalysisReport, StatsCalculator};

/// Derive features for `table` and test sampled terms.
pub fn analyze(
    table: Table,
    config: &AnalysisConfig,
) -> Result<(ProcessedTable, AnalysisReport), stats::StatsError> {
    let processed = DataProcessor::process(table, config);
    let report = StatsCalculator::run(&processed, config)?;
    Ok((processed, report))
}
