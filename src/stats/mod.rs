//! Stats module - term usage counting and significance testing

mod calculator;
mod report;

pub use calculator::{
    chi_square_test, count_usage, expected_counts, ChiSquareOutcome, StatsCalculator, StatsError,
    UsageCount, ValueTotals,
};
pub use report::{AnalysisReport, TermTest};
