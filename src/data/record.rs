//! Record types for the question table.

use chrono::NaiveDate;

/// One question entry as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub show_number: i64,
    pub air_date: NaiveDate,
    pub round: String,
    pub category: String,
    /// Raw value cell, e.g. `"$1,000"` or `"None"`.
    pub value: String,
    pub question: String,
    pub answer: String,
}

/// A record together with its derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub record: Record,
    pub clean_question: String,
    pub clean_answer: String,
    pub clean_value: u64,
    /// Share of answer tokens that also appear in the question, in `[0, 1]`.
    pub answer_in_question: f64,
    /// Share of long question terms already seen in earlier rows, in `[0, 1]`.
    pub question_overlap: f64,
    pub high_value: bool,
}

impl ProcessedRecord {
    /// Whitespace tokens of the cleaned question.
    pub fn question_tokens(&self) -> impl Iterator<Item = &str> {
        self.clean_question.split_whitespace()
    }
}

/// Question records in input file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Table {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
