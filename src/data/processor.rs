//! Data Processor Module
//! Derives per-row features from the loaded question table.

use crate::config::AnalysisConfig;
use crate::data::normalize::{normalize_text, normalize_value};
use crate::data::record::{ProcessedRecord, Record, Table};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Long question terms seen so far, in first-seen order.
///
/// Only grows. Processing rows in a different order yields different
/// overlap ratios, so a history must be fed rows in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermHistory {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl TermHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.seen.contains(term)
    }

    /// Returns `true` when `term` was not present before.
    pub fn insert(&mut self, term: &str) -> bool {
        if self.seen.contains(term) {
            return false;
        }
        self.seen.insert(term.to_string());
        self.order.push(term.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Terms in the order they were first inserted.
    pub fn terms(&self) -> &[String] {
        &self.order
    }

    /// The first `n` distinct terms in first-seen order.
    pub fn sample(&self, n: usize) -> Vec<String> {
        self.order.iter().take(n).cloned().collect()
    }
}

/// Share of answer tokens that occur in the question.
///
/// The first `"the"` is dropped from the answer beforehand. Repeated answer
/// tokens count once per occurrence. An answer with no tokens scores 0.
pub fn answer_in_question(clean_answer: &str, clean_question: &str) -> f64 {
    let mut answer_tokens: Vec<&str> = clean_answer.split_whitespace().collect();
    if let Some(pos) = answer_tokens.iter().position(|&t| t == "the") {
        answer_tokens.remove(pos);
    }
    if answer_tokens.is_empty() {
        return 0.0;
    }

    let question_tokens: Vec<&str> = clean_question.split_whitespace().collect();
    let matches = answer_tokens
        .iter()
        .filter(|t| question_tokens.contains(t))
        .count();
    matches as f64 / answer_tokens.len() as f64
}

/// Share of this question's long terms already present in `history`.
///
/// Terms of `min_term_length` characters or fewer are ignored. All long terms
/// are added to `history` after counting, so repeats within one question do
/// not match each other.
pub fn question_overlap(
    clean_question: &str,
    history: &mut TermHistory,
    min_term_length: usize,
) -> f64 {
    let terms: Vec<&str> = clean_question
        .split_whitespace()
        .filter(|t| t.chars().count() > min_term_length)
        .collect();

    let matches = terms.iter().filter(|t| history.contains(t)).count();
    for term in &terms {
        history.insert(term);
    }

    if terms.is_empty() {
        0.0
    } else {
        matches as f64 / terms.len() as f64
    }
}

pub fn high_value(clean_value: u64, threshold: u64) -> bool {
    clean_value > threshold
}

/// Aggregate view of the derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub rows: usize,
    pub answer_in_question_mean: f64,
    pub question_overlap_mean: f64,
    pub high_value_count: usize,
    pub low_value_count: usize,
}

/// Derived table plus the term history built while deriving it.
#[derive(Debug, Clone)]
pub struct ProcessedTable {
    pub rows: Vec<ProcessedRecord>,
    pub history: TermHistory,
}

impl ProcessedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn high_value_count(&self) -> usize {
        self.rows.iter().filter(|r| r.high_value).count()
    }

    pub fn low_value_count(&self) -> usize {
        self.len() - self.high_value_count()
    }

    pub fn summary(&self) -> FeatureSummary {
        let n = self.len();
        let mean = |f: fn(&ProcessedRecord) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.rows.iter().map(f).sum::<f64>() / n as f64
            }
        };
        let high = self.high_value_count();

        FeatureSummary {
            rows: n,
            answer_in_question_mean: mean(|r| r.answer_in_question),
            question_overlap_mean: mean(|r| r.question_overlap),
            high_value_count: high,
            low_value_count: n - high,
        }
    }

    /// Raw and derived columns as a Polars frame, in table order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = &self.rows;

        DataFrame::new(vec![
            Column::new(
                "show_number".into(),
                rows.iter().map(|r| r.record.show_number).collect::<Vec<i64>>(),
            ),
            Column::new(
                "air_date".into(),
                rows.iter()
                    .map(|r| r.record.air_date)
                    .collect::<Vec<chrono::NaiveDate>>(),
            ),
            text_column("round", rows, |r| r.record.round.as_str()),
            text_column("category", rows, |r| r.record.category.as_str()),
            text_column("value", rows, |r| r.record.value.as_str()),
            text_column("question", rows, |r| r.record.question.as_str()),
            text_column("answer", rows, |r| r.record.answer.as_str()),
            text_column("clean_question", rows, |r| r.clean_question.as_str()),
            text_column("clean_answer", rows, |r| r.clean_answer.as_str()),
            Column::new(
                "clean_value".into(),
                rows.iter().map(|r| r.clean_value).collect::<Vec<u64>>(),
            ),
            Column::new(
                "answer_in_question".into(),
                rows.iter().map(|r| r.answer_in_question).collect::<Vec<f64>>(),
            ),
            Column::new(
                "question_overlap".into(),
                rows.iter().map(|r| r.question_overlap).collect::<Vec<f64>>(),
            ),
            Column::new(
                "high_value".into(),
                rows.iter().map(|r| r.high_value).collect::<Vec<bool>>(),
            ),
        ])
    }
}

fn text_column(name: &str, rows: &[ProcessedRecord], f: fn(&ProcessedRecord) -> &str) -> Column {
    Column::new(name.into(), rows.iter().map(f).collect::<Vec<&str>>())
}

/// Runs the feature derivation pipeline.
pub struct DataProcessor;

impl DataProcessor {
    /// Row-independent cleaning and features; `question_overlap` is left at 0.
    fn clean_record(record: Record, config: &AnalysisConfig) -> ProcessedRecord {
        let clean_question = normalize_text(&record.question);
        let clean_answer = normalize_text(&record.answer);
        let clean_value = normalize_value(&record.value);

        ProcessedRecord {
            answer_in_question: answer_in_question(&clean_answer, &clean_question),
            high_value: high_value(clean_value, config.high_value_threshold),
            question_overlap: 0.0,
            clean_question,
            clean_answer,
            clean_value,
            record,
        }
    }

    /// Derive every feature column for `table`.
    ///
    /// Cleaning runs in parallel; the overlap pass walks rows in table order
    /// against a fresh history.
    pub fn process(table: Table, config: &AnalysisConfig) -> ProcessedTable {
        let mut rows: Vec<ProcessedRecord> = table
            .into_records()
            .into_par_iter()
            .map(|record| Self::clean_record(record, config))
            .collect();

        let mut history = TermHistory::new();
        for row in &mut rows {
            row.question_overlap =
                question_overlap(&row.clean_question, &mut history, config.min_term_length);
        }

        let processed = ProcessedTable { rows, history };
        let summary = processed.summary();
        info!(
            rows = summary.rows,
            terms = processed.history.len(),
            answer_in_question_mean = summary.answer_in_question_mean,
            question_overlap_mean = summary.question_overlap_mean,
            high_value = summary.high_value_count,
            "derived features"
        );
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_in_question_drops_the() {
        assert_eq!(answer_in_question("the cat", "the cat sat"), 1.0);
    }

    #[test]
    fn answer_in_question_empty_answer() {
        assert_eq!(answer_in_question("", "anything at all"), 0.0);
        assert_eq!(answer_in_question("the", "the cat"), 0.0);
    }

    #[test]
    fn answer_in_question_removes_only_one_the() {
        // ["the", "end"] remain; only "end" is in the question
        assert_eq!(answer_in_question("the the end", "the end"), 1.0);
        assert_eq!(answer_in_question("the the end", "an end"), 0.5);
    }

    #[test]
    fn answer_in_question_counts_repeats() {
        assert_eq!(answer_in_question("new new york", "new jersey"), 2.0 / 3.0);
    }

    #[test]
    fn answer_in_question_matches_whole_tokens() {
        assert_eq!(answer_in_question("cat", "concatenate"), 0.0);
    }

    #[test]
    fn question_overlap_counts_prior_terms() {
        let mut history = TermHistory::new();
        let first = question_overlap("galileo observed jupiter moons", &mut history, 5);
        assert_eq!(first, 0.0);
        assert_eq!(history.terms(), ["galileo", "observed", "jupiter"]);

        let second = question_overlap("jupiter largest moon", &mut history, 5);
        assert_eq!(second, 0.5);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn question_overlap_short_terms_only() {
        let mut history = TermHistory::new();
        assert_eq!(question_overlap("a cat sat on mat", &mut history, 5), 0.0);
        assert!(history.is_empty());
    }

    #[test]
    fn question_overlap_length_boundary() {
        let mut history = TermHistory::new();
        question_overlap("house castle", &mut history, 5);
        assert!(!history.contains("house"));
        assert!(history.contains("castle"));
    }

    #[test]
    fn question_overlap_repeat_within_row_does_not_self_match() {
        let mut history = TermHistory::new();
        assert_eq!(question_overlap("violin violin", &mut history, 5), 0.0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn question_overlap_depends_on_order() {
        let a = "ancient egyptian pyramids";
        let b = "egyptian pharaoh tombs";

        let mut forward = TermHistory::new();
        let fa = question_overlap(a, &mut forward, 5);
        let fb = question_overlap(b, &mut forward, 5);

        let mut reversed = TermHistory::new();
        let rb = question_overlap(b, &mut reversed, 5);
        let ra = question_overlap(a, &mut reversed, 5);

        assert_eq!((fa, fb), (0.0, 0.5));
        assert_eq!((rb, ra), (0.0, 1.0 / 3.0));
        assert_ne!((fa, fb), (ra, rb));
    }

    #[test]
    fn high_value_boundary_is_exclusive() {
        assert!(high_value(801, 800));
        assert!(!high_value(800, 800));
        assert!(!high_value(0, 800));
    }

    #[test]
    fn history_sample_keeps_first_seen_order() {
        let mut history = TermHistory::new();
        for term in ["zebra", "apple", "mango", "apple", "kiwi"] {
            history.insert(term);
        }
        assert_eq!(history.sample(2), ["zebra", "apple"]);
        assert_eq!(history.sample(10), ["zebra", "apple", "mango", "kiwi"]);
    }

    #[test]
    fn summary_of_empty_table() {
        let processed = DataProcessor::process(Table::default(), &AnalysisConfig::default());
        let summary = processed.summary();
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.answer_in_question_mean, 0.0);
        assert_eq!(summary.high_value_count, 0);
    }
}
