//! CSV Data Loader Module
//! Reads the question file with Polars and converts it into typed records.

use crate::data::record::{Record, Table};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const SHOW_NUMBER: &str = "Show Number";
pub const AIR_DATE: &str = "Air Date";
pub const ROUND: &str = "Round";
pub const CATEGORY: &str = "Category";
pub const VALUE: &str = "Value";
pub const QUESTION: &str = "Question";
pub const ANSWER: &str = "Answer";

/// Columns every input file must carry, in canonical spelling.
pub const REQUIRED_COLUMNS: [&str; 7] =
    [SHOW_NUMBER, AIR_DATE, ROUND, CATEGORY, VALUE, QUESTION, ANSWER];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column '{column}' (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },
    #[error("Invalid {column} at row {row}: {value:?}")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("No data loaded")]
    NoData,
}

/// Loads the question table with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Read a CSV file with every column kept as a string column.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let file_path = file_path.as_ref();
        self.file_path = Some(file_path.to_path_buf());

        // Schema inference off: typed parsing happens per field below
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set DataFrame directly.
    pub fn set_dataframe(&mut self, df: DataFrame) {
        self.df = Some(df);
    }

    /// Convert the loaded frame into a typed table.
    pub fn to_table(&self) -> Result<Table, LoaderError> {
        let df = self.df.as_ref().ok_or(LoaderError::NoData)?;
        Self::table_from_frame(df)
    }

    /// Read `file_path` and convert it in one step.
    pub fn load_table(file_path: impl AsRef<Path>) -> Result<Table, LoaderError> {
        let mut loader = Self::new();
        loader.load_csv(file_path)?;
        loader.to_table()
    }

    /// Build records from a frame whose headers may carry stray whitespace.
    pub fn table_from_frame(df: &DataFrame) -> Result<Table, LoaderError> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut columns: Vec<Vec<Option<String>>> = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let header = Self::resolve_header(&headers, name)?;
            debug!(column = name, header = header.as_str(), "resolved header");
            columns.push(Self::string_values(df, &header)?);
        }

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let cell = |idx: usize| columns[idx][row].clone();
            let text = |idx: usize| cell(idx).unwrap_or_default();

            records.push(Record {
                show_number: Self::parse_show_number(row, cell(0))?,
                air_date: Self::parse_air_date(row, cell(1))?,
                round: text(2),
                category: text(3),
                value: text(4),
                question: text(5),
                answer: text(6),
            });
        }

        info!(rows = records.len(), "parsed records");
        Ok(Table::new(records))
    }

    /// Find the source header matching `name`, ignoring surrounding whitespace and case.
    fn resolve_header(headers: &[String], name: &str) -> Result<String, LoaderError> {
        headers
            .iter()
            .find(|h| h.trim().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| LoaderError::MissingColumn {
                column: name.to_string(),
                found: headers.to_vec(),
            })
    }

    fn string_values(df: &DataFrame, header: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let column = df.column(header)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    fn parse_show_number(row: usize, cell: Option<String>) -> Result<i64, LoaderError> {
        let raw = cell.unwrap_or_default();
        raw.trim().parse().map_err(|_| LoaderError::InvalidField {
            row,
            column: SHOW_NUMBER,
            value: raw,
        })
    }

    fn parse_air_date(row: usize, cell: Option<String>) -> Result<NaiveDate, LoaderError> {
        let raw = cell.unwrap_or_default();
        let trimmed = raw.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .ok_or(LoaderError::InvalidField {
                row,
                column: AIR_DATE,
                value: raw,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(headers: &[&str], rows: &[[&str; 7]]) -> DataFrame {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let values: Vec<&str> = rows.iter().map(|r| r[i]).collect();
                Column::new((*h).into(), values)
            })
            .collect();
        DataFrame::new(columns).unwrap()
    }

    const PADDED: [&str; 7] = [
        "Show Number",
        " Air Date",
        " Round",
        " Category",
        " Value",
        " Question",
        " Answer",
    ];

    #[test]
    fn headers_with_surrounding_whitespace_resolve() {
        let df = frame(
            &PADDED,
            &[[
                "4680",
                "2004-12-31",
                "Jeopardy!",
                "HISTORY",
                "$200",
                "For the last 8 years of his life, Galileo was under house arrest",
                "Copernicus",
            ]],
        );
        let table = DataLoader::table_from_frame(&df).unwrap();
        assert_eq!(table.len(), 1);
        let record = &table.records()[0];
        assert_eq!(record.show_number, 4680);
        assert_eq!(
            record.air_date,
            NaiveDate::from_ymd_opt(2004, 12, 31).unwrap()
        );
        assert_eq!(record.value, "$200");
        assert_eq!(record.answer, "Copernicus");
    }

    #[test]
    fn missing_column_is_fatal() {
        let df = DataFrame::new(vec![
            Column::new("Show Number".into(), ["1"]),
            Column::new("Air Date".into(), ["2004-12-31"]),
        ])
        .unwrap();
        let err = DataLoader::table_from_frame(&df).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { ref column, .. } if column == ROUND));
    }

    #[test]
    fn bad_air_date_reports_row() {
        let df = frame(
            &PADDED,
            &[
                ["1", "2004-12-31", "r", "c", "$1", "q", "a"],
                ["2", "yesterday", "r", "c", "$1", "q", "a"],
            ],
        );
        let err = DataLoader::table_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::InvalidField {
                row: 1,
                column: AIR_DATE,
                ..
            }
        ));
    }

    #[test]
    fn bad_show_number_is_fatal() {
        let df = frame(&PADDED, &[["abc", "2004-12-31", "r", "c", "$1", "q", "a"]]);
        assert!(matches!(
            DataLoader::table_from_frame(&df),
            Err(LoaderError::InvalidField {
                column: SHOW_NUMBER,
                ..
            })
        ));
    }

    #[test]
    fn alternative_date_formats() {
        let df = frame(&PADDED, &[["1", "12/31/2004", "r", "c", "None", "q", "a"]]);
        let table = DataLoader::table_from_frame(&df).unwrap();
        assert_eq!(
            table.records()[0].air_date,
            NaiveDate::from_ymd_opt(2004, 12, 31).unwrap()
        );
    }

    #[test]
    fn set_dataframe_then_convert() {
        let mut loader = DataLoader::new();
        loader.set_dataframe(frame(
            &REQUIRED_COLUMNS,
            &[["7", "1999-01-04", "r", "c", "$1,000", "q", "a"]],
        ));
        assert_eq!(loader.get_row_count(), 1);
        let table = loader.to_table().unwrap();
        assert_eq!(table.records()[0].show_number, 7);
        assert_eq!(table.records()[0].value, "$1,000");
    }

    #[test]
    fn to_table_without_data() {
        assert!(matches!(DataLoader::new().to_table(), Err(LoaderError::NoData)));
    }
}
