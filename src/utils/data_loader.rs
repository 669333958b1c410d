//! CSV loading and column extraction
//!
//! Every cell is read as text so that response columns holding stray
//! non-numeric values do not abort schema inference; numeric coercion
//! happens per column afterwards.

use crate::error::{EmbedError, Result};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Loader for the survey CSV inputs
#[derive(Debug, Clone)]
pub struct DataLoader {
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new comma-separated loader
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a CSV file with a header row, every column typed as string.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| EmbedError::DataError(format!("{}: {}", path.display(), e)))?
            .finish()
            .map_err(|e| EmbedError::DataError(format!("{}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed = ?start.elapsed(),
            "Loaded CSV"
        );
        Ok(df)
    }
}

/// Whether `df` carries a column called `name`.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Extract a column as optional strings (nulls stay `None`).
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| EmbedError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let ca = series.str()?;

    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Extract a column coerced to numbers.
///
/// Empty, null and unparseable cells all become `None`.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(string_column(df, name)?
        .into_iter()
        .map(|cell| cell.as_deref().and_then(parse_number))
        .collect())
}

/// Parse a single cell as a number; NaN and infinities count as missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
