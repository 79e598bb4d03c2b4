//! Analysis report types and plain-text rendering.

use crate::config::AnalysisConfig;
use crate::data::FeatureSummary;
use crate::stats::calculator::{ChiSquareOutcome, UsageCount, ValueTotals};
use serde::Serialize;
use std::fmt::Write;

/// Observed vs expected usage of one sampled term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermTest {
    pub term: String,
    pub observed: UsageCount,
    pub expected_high: f64,
    pub expected_low: f64,
    pub outcome: ChiSquareOutcome,
    pub significant: bool,
}

/// Everything a run produces besides the enriched frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub summary: FeatureSummary,
    pub totals: ValueTotals,
    pub terms: Vec<TermTest>,
}

impl AnalysisReport {
    pub fn significant_terms(&self) -> impl Iterator<Item = &TermTest> {
        self.terms.iter().filter(|t| t.significant)
    }

    /// Render summary and term results as aligned text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        // Writing to a String cannot fail
        let _ = writeln!(out, "Rows: {}", s.rows);
        let _ = writeln!(out, "Mean answer_in_question: {:.4}", s.answer_in_question_mean);
        let _ = writeln!(out, "Mean question_overlap:   {:.4}", s.question_overlap_mean);
        let _ = writeln!(
            out,
            "High value rows (> {}): {}  Low value rows: {}",
            self.config.high_value_threshold, s.high_value_count, s.low_value_count
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<20} {:>6} {:>6} {:>10} {:>10} {:>10} {:>10}  sig",
            "term", "high", "low", "exp_high", "exp_low", "chi2", "p_value"
        );

        for t in &self.terms {
            let (stat, p) = match &t.outcome {
                ChiSquareOutcome::Computed { statistic, p_value } => {
                    (format!("{statistic:.4}"), format!("{p_value:.4}"))
                }
                ChiSquareOutcome::Undetermined { .. } => {
                    ("undetermined".to_string(), "-".to_string())
                }
            };
            let _ = writeln!(
                out,
                "{:<20} {:>6} {:>6} {:>10.3} {:>10.3} {:>10} {:>10}  {}",
                t.term,
                t.observed.high,
                t.observed.low,
                t.expected_high,
                t.expected_low,
                stat,
                p,
                if t.significant { "*" } else { "" }
            );
        }
        out
    }
}
