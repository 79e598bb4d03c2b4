//! Statistics Calculator Module
//! Counts term usage across value strata and runs chi-squared goodness-of-fit tests.

use crate::config::AnalysisConfig;
use crate::data::{ProcessedRecord, ProcessedTable};
use crate::stats::report::{AnalysisReport, TermTest};
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Relative tolerance when comparing observed and expected totals.
const SUM_TOLERANCE: f64 = 1e-8;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Cannot compute expected counts for an empty table")]
    EmptyTable,
    #[error("Term '{term}' counted in {count} rows but the table has {rows}")]
    CountExceedsTable {
        term: String,
        count: usize,
        rows: usize,
    },
    #[error("Observed has {observed} categories but expected has {expected}")]
    LengthMismatch { observed: usize, expected: usize },
    #[error("Chi-squared test needs at least 2 categories, got {0}")]
    TooFewCategories(usize),
    #[error("Invalid observed count {0}")]
    InvalidObserved(f64),
    #[error("Invalid expected count {0}")]
    InvalidExpected(f64),
    #[error("Observed total {observed} does not match expected total {expected}")]
    SumMismatch { observed: f64, expected: f64 },
    #[error("Chi-squared distribution error: {0}")]
    Distribution(String),
}

/// Rows containing a term, split by value stratum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageCount {
    pub high: usize,
    pub low: usize,
}

impl UsageCount {
    pub fn total(&self) -> usize {
        self.high + self.low
    }

    pub fn as_observed(&self) -> [f64; 2] {
        [self.high as f64, self.low as f64]
    }
}

/// Table-wide row counts per value stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueTotals {
    pub rows: usize,
    pub high: usize,
    pub low: usize,
}

impl ValueTotals {
    pub fn from_table(table: &ProcessedTable) -> Self {
        let high = table.high_value_count();
        Self {
            rows: table.len(),
            high,
            low: table.len() - high,
        }
    }
}

/// Result of a single goodness-of-fit test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChiSquareOutcome {
    Computed { statistic: f64, p_value: f64 },
    /// A zero expected cell makes the statistic infinite or 0/0.
    Undetermined { reason: String },
}

impl ChiSquareOutcome {
    pub fn p_value(&self) -> Option<f64> {
        match self {
            Self::Computed { p_value, .. } => Some(*p_value),
            Self::Undetermined { .. } => None,
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value().is_some_and(|p| p <= alpha)
    }
}

/// Count rows whose cleaned question contains `term` as a whole token.
pub fn count_usage(term: &str, rows: &[ProcessedRecord]) -> UsageCount {
    let mut usage = UsageCount::default();
    for row in rows {
        if row.question_tokens().any(|t| t == term) {
            if row.high_value {
                usage.high += 1;
            } else {
                usage.low += 1;
            }
        }
    }
    usage
}

/// Expected `[high, low]` counts for a term under the table's marginal proportions.
pub fn expected_counts(
    term: &str,
    usage: UsageCount,
    totals: ValueTotals,
) -> Result<[f64; 2], StatsError> {
    if totals.rows == 0 {
        return Err(StatsError::EmptyTable);
    }
    if usage.total() > totals.rows {
        return Err(StatsError::CountExceedsTable {
            term: term.to_string(),
            count: usage.total(),
            rows: totals.rows,
        });
    }

    let proportion = usage.total() as f64 / totals.rows as f64;
    Ok([
        proportion * totals.high as f64,
        proportion * totals.low as f64,
    ])
}

/// Pearson chi-squared goodness-of-fit test with `k - 1` degrees of freedom.
pub fn chi_square_test(observed: &[f64], expected: &[f64]) -> Result<ChiSquareOutcome, StatsError> {
    if observed.len() != expected.len() {
        return Err(StatsError::LengthMismatch {
            observed: observed.len(),
            expected: expected.len(),
        });
    }
    if observed.len() < 2 {
        return Err(StatsError::TooFewCategories(observed.len()));
    }
    if let Some(&o) = observed.iter().find(|o| !o.is_finite() || **o < 0.0) {
        return Err(StatsError::InvalidObserved(o));
    }
    if let Some(&e) = expected.iter().find(|e| !e.is_finite() || **e < 0.0) {
        return Err(StatsError::InvalidExpected(e));
    }
    if let Some(idx) = expected.iter().position(|&e| e == 0.0) {
        return Ok(ChiSquareOutcome::Undetermined {
            reason: format!("expected count in category {idx} is zero"),
        });
    }

    let observed_sum: f64 = observed.iter().sum();
    let expected_sum: f64 = expected.iter().sum();
    if (observed_sum - expected_sum).abs() > SUM_TOLERANCE * observed_sum.max(expected_sum) {
        return Err(StatsError::SumMismatch {
            observed: observed_sum,
            expected: expected_sum,
        });
    }

    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    let dist = ChiSquared::new((observed.len() - 1) as f64)
        .map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = dist.sf(statistic);

    Ok(ChiSquareOutcome::Computed { statistic, p_value })
}

/// Runs term usage comparisons over a processed table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Test a single term against the table totals.
    pub fn test_term(
        term: &str,
        usage: UsageCount,
        totals: ValueTotals,
        alpha: f64,
    ) -> Result<TermTest, StatsError> {
        let [expected_high, expected_low] = expected_counts(term, usage, totals)?;
        let outcome = chi_square_test(&usage.as_observed(), &[expected_high, expected_low])?;

        match &outcome {
            ChiSquareOutcome::Computed { statistic, p_value } => {
                debug!(term, statistic, p_value, "chi-squared computed");
            }
            ChiSquareOutcome::Undetermined { reason } => {
                warn!(term, reason = reason.as_str(), "chi-squared undetermined");
            }
        }

        Ok(TermTest {
            term: term.to_string(),
            observed: usage,
            expected_high,
            expected_low,
            significant: outcome.is_significant(alpha),
            outcome,
        })
    }

    /// Sample terms from the history and test each of them.
    ///
    /// Terms are the first `sample_size` history entries in first-seen order.
    /// Usage counting runs in parallel; results keep the sample order.
    pub fn run(table: &ProcessedTable, config: &AnalysisConfig) -> Result<AnalysisReport, StatsError> {
        let terms = table.history.sample(config.sample_size);
        let totals = ValueTotals::from_table(table);

        let usages: Vec<(String, UsageCount)> = terms
            .into_par_iter()
            .map(|term| {
                let usage = count_usage(&term, &table.rows);
                (term, usage)
            })
            .collect();

        let tests = usages
            .iter()
            .map(|(term, usage)| {
                Self::test_term(term, *usage, totals, config.significance_level)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            terms = tests.len(),
            significant = tests.iter().filter(|t| t.significant).count(),
            "term tests complete"
        );

        Ok(AnalysisReport {
            config: *config,
            summary: table.summary(),
            totals,
            terms: tests,
        })
    }
}
