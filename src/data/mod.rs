//! Data module - loading, normalization and feature derivation

mod loader;
mod normalize;
mod processor;
mod record;

pub use loader::{DataLoader, LoaderError, REQUIRED_COLUMNS};
pub use normalize::{normalize_text, normalize_value, parse_value};
pub use processor::{
    answer_in_question, high_value, question_overlap, DataProcessor, FeatureSummary,
    ProcessedTable, TermHistory,
};
pub use record::{ProcessedRecord, Record, Table};
