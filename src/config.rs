//! Analysis Configuration Module
//! Fixed policy constants for feature derivation and term testing.

use serde::Serialize;

/// Rows with a clean value strictly above this are high-value.
pub const HIGH_VALUE_THRESHOLD: u64 = 800;

/// Question terms must be strictly longer than this to count as recyclable.
pub const MIN_TERM_LENGTH: usize = 5;

/// Number of history terms compared between high and low value rows.
pub const SAMPLE_SIZE: usize = 5;

/// Significance threshold for the chi-squared test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Policy knobs for a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub high_value_threshold: u64,
    pub min_term_length: usize,
    pub sample_size: usize,
    pub significance_level: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: HIGH_VALUE_THRESHOLD,
            min_term_length: MIN_TERM_LENGTH,
            sample_size: SAMPLE_SIZE,
            significance_level: SIGNIFICANCE_THRESHOLD,
        }
    }
}
