//! CSV Data Loader Module
//! Loads a campaign CSV file with Polars and normalises it to the fixed schema.

use crate::data::schema::{Arm, CAMPAIGN_NAME, COLUMN_LABELS, DATE, NUMERIC_COLUMNS};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("Failed to load CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{} has {found} columns, expected {}", path.display(), COLUMN_LABELS.len())]
    ColumnCount { path: PathBuf, found: usize },
    #[error("{} contains no data rows", path.display())]
    Empty { path: PathBuf },
    #[error("Unparseable date '{value}' in row {row}")]
    InvalidDate { row: usize, value: String },
    #[error("Non-numeric value '{value}' in column '{column}', row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One loaded campaign table.
#[derive(Debug, Clone)]
pub struct CampaignTable {
    pub arm: Arm,
    /// Campaign Name value carried by the rows.
    pub name: String,
    pub path: PathBuf,
    pub df: DataFrame,
}

impl CampaignTable {
    pub fn row_count(&self) -> usize {
        self.df.height()
    }
}

/// Loads campaign CSV files with a fixed separator.
pub struct CampaignLoader {
    separator: u8,
}

impl Default for CampaignLoader {
    fn default() -> Self {
        Self::new(b';')
    }
}

impl CampaignLoader {
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    /// Load and normalise one campaign file.
    pub fn load(&self, path: &Path, arm: Arm) -> Result<CampaignTable, LoaderError> {
        let df = self.load_csv(path)?;
        let name = campaign_label(&df).unwrap_or_else(|| arm.default_name().to_string());

        tracing::info!(
            arm = %arm,
            path = %path.display(),
            rows = df.height(),
            campaign = %name,
            "Loaded campaign table"
        );

        Ok(CampaignTable {
            arm,
            name,
            path: path.to_path_buf(),
            df,
        })
    }

    /// Read the raw CSV, rename the columns positionally, parse dates and
    /// cast the metric columns to Float64.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let separator = self.separator;
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .map_parse_options(|opts| opts.with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        if df.width() != COLUMN_LABELS.len() {
            return Err(LoaderError::ColumnCount {
                path: path.to_path_buf(),
                found: df.width(),
            });
        }
        if df.height() == 0 {
            return Err(LoaderError::Empty {
                path: path.to_path_buf(),
            });
        }

        df.set_column_names(COLUMN_LABELS)?;
        trim_campaign_names(&mut df)?;
        parse_date_column(&mut df)?;
        cast_numeric_columns(&mut df)?;

        tracing::debug!(path = %path.display(), columns = ?df.get_column_names(), "Normalised schema");
        Ok(df)
    }
}

/// First non-null Campaign Name in the table.
pub fn campaign_label(df: &DataFrame) -> Option<String> {
    let names = df.column(CAMPAIGN_NAME).ok()?.cast(&DataType::String).ok()?;
    let label = names
        .str()
        .ok()?
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string);
    label
}

/// Parse a single date value using the accepted layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Strip surrounding whitespace from Campaign Name so row filters match the label.
fn trim_campaign_names(df: &mut DataFrame) -> Result<(), LoaderError> {
    let names: Vec<Option<String>> = df
        .column(CAMPAIGN_NAME)?
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|name| name.map(|n| n.trim().to_string()))
        .collect();

    df.with_column(Column::new(CAMPAIGN_NAME.into(), names))?;
    Ok(())
}

/// Cast every metric column to Float64.
///
/// Empty cells stay null. Any other cell that does not parse as a number is
/// an error rather than a silent null.
fn cast_numeric_columns(df: &mut DataFrame) -> Result<(), LoaderError> {
    for name in NUMERIC_COLUMNS {
        let raw = df.column(name)?.clone();
        let cast = raw.cast(&DataType::Float64)?;

        if cast.null_count() != raw.null_count() {
            let text = raw.cast(&DataType::String)?;
            let bad = text
                .str()?
                .into_iter()
                .zip(cast.f64()?.into_iter())
                .enumerate()
                .find_map(|(row, pair)| match pair {
                    (Some(value), None) => Some((row, value.to_string())),
                    _ => None,
                });
            if let Some((row, value)) = bad {
                return Err(LoaderError::InvalidNumber {
                    column: name.to_string(),
                    row,
                    value,
                });
            }
        }

        df.with_column(cast)?;
    }
    Ok(())
}

/// Replace the textual Date column with a typed Date column.
fn parse_date_column(df: &mut DataFrame) -> Result<(), LoaderError> {
    let raw = df.column(DATE)?.cast(&DataType::String)?;
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(raw.len());

    for (row, value) in raw.str()?.into_iter().enumerate() {
        let value = value.unwrap_or_default();
        let date = parse_date(value).ok_or_else(|| LoaderError::InvalidDate {
            row,
            value: value.to_string(),
        })?;
        dates.push(date);
    }

    df.with_column(Series::new(DATE.into(), dates))?;
    Ok(())
}
