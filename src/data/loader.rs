//! Production Data Loader Module
//! Loads CSV (Polars) and Excel (calamine) files into typed production records.

use super::record::{
    ProductionRecord, COLUMNS, COL_DATE, COL_DOWNTIME, COL_DOWNTIME_REASON, COL_GOOD_COUNT,
    COL_IDEAL_CYCLE_TIME, COL_MACHINE, COL_PLANNED_TIME, COL_SHIFT, COL_TOTAL_COUNT,
    REQUIRED_COLUMNS,
};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    ExcelError(#[from] calamine::Error),
    #[error("Unsupported file type '{0}'. Please upload CSV or Excel.")]
    UnsupportedFormat(String),
    #[error("Spreadsheet contains no worksheets")]
    NoWorksheet,
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: String },
    #[error("Row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: '{value}' in column '{column}' is not a non-negative whole number")]
    InvalidCount {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: '{value}' in column '{column}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: {message}")]
    InvariantViolation { row: usize, message: String },
    #[error("No data loaded")]
    NoData,
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    pub const CSV_EXTENSIONS: &'static [&'static str] = &["csv"];
    pub const SPREADSHEET_EXTENSIONS: &'static [&'static str] = &["xlsx", "xls", "xlsm", "ods"];

    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if Self::CSV_EXTENSIONS.contains(&ext.as_str()) {
            Ok(FileFormat::Csv)
        } else if Self::SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Ok(FileFormat::Spreadsheet)
        } else {
            Err(LoaderError::UnsupportedFormat(ext))
        }
    }

    /// Every extension the loader accepts, for file dialogs.
    pub fn all_extensions() -> Vec<&'static str> {
        Self::CSV_EXTENSIONS
            .iter()
            .chain(Self::SPREADSHEET_EXTENSIONS)
            .copied()
            .collect()
    }
}

/// Header row plus text cells, before typing.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Holds the active dataset and where it came from.
pub struct DataLoader {
    records: Vec<ProductionRecord>,
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
            records: Vec::new(),
            file_path: None,
        }
    }

    /// Replace the active dataset (used for background loading).
    pub fn set_records(&mut self, file_path: PathBuf, records: Vec<ProductionRecord>) {
        self.file_path = Some(file_path);
        self.records = records;
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// File name of the active dataset, for display.
    pub fn file_name(&self) -> Option<String> {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    /// Parse a CSV or spreadsheet into production records without touching loader state.
    pub fn read_file(path: &Path) -> Result<Vec<ProductionRecord>, LoaderError> {
        let table = match FileFormat::from_path(path)? {
            FileFormat::Csv => Self::read_csv_table(path)?,
            FileFormat::Spreadsheet => Self::read_spreadsheet_table(path)?,
        };
        debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "read raw table"
        );

        let records = Self::parse_table(&table)?;
        info!(path = %path.display(), records = records.len(), "loaded production data");
        Ok(records)
    }

    /// Read every CSV column as text so numeric checks report the offending cell.
    fn read_csv_table(path: &Path) -> Result<RawTable, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = vec![vec![String::new(); headers.len()]; df.height()];
        for (col_idx, column) in df.get_columns().iter().enumerate() {
            let values = column.str()?;
            for (row_idx, value) in values.into_iter().enumerate() {
                if let Some(v) = value {
                    rows[row_idx][col_idx] = v.trim().to_string();
                }
            }
        }

        Ok(RawTable { headers, rows })
    }

    /// Read the first worksheet; its first row is the header.
    fn read_spreadsheet_table(path: &Path) -> Result<RawTable, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or(LoaderError::NoData)?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let rows = rows
            .map(|row| row.iter().map(Self::spreadsheet_cell_text).collect())
            .collect();

        Ok(RawTable { headers, rows })
    }

    fn spreadsheet_cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::DateTime(_) | Data::DateTimeIso(_) => cell
                .as_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| cell.to_string()),
            _ => cell.to_string().trim().to_string(),
        }
    }

    /// Map schema column names to their position in the header row.
    fn resolve_columns(headers: &[String]) -> Result<HashMap<&'static str, usize>, LoaderError> {
        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim().to_lowercase();
            if let Some(column) = COLUMNS.iter().find(|c| **c == name) {
                positions.entry(*column).or_insert(idx);
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(positions)
        } else {
            Err(LoaderError::MissingColumns(missing))
        }
    }

    fn parse_table(table: &RawTable) -> Result<Vec<ProductionRecord>, LoaderError> {
        let positions = Self::resolve_columns(&table.headers)?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (idx, row) in table.rows.iter().enumerate() {
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            let cells = RowCells {
                row: idx + 1,
                values: row,
                positions: &positions,
            };
            records.push(cells.to_record()?);
        }

        if records.is_empty() {
            return Err(LoaderError::NoData);
        }
        Ok(records)
    }
}

/// One data row with its 1-based row number, for error reporting.
struct RowCells<'a> {
    row: usize,
    values: &'a [String],
    positions: &'a HashMap<&'static str, usize>,
}

impl RowCells<'_> {
    fn to_record(&self) -> Result<ProductionRecord, LoaderError> {
        let record = ProductionRecord {
            date: self.date(COL_DATE)?,
            machine: self.text(COL_MACHINE)?.to_string(),
            shift: self.text(COL_SHIFT)?.to_string(),
            planned_time: self.number(COL_PLANNED_TIME)?,
            downtime: self.number(COL_DOWNTIME)?,
            good_count: self.count(COL_GOOD_COUNT)?,
            total_count: self.count(COL_TOTAL_COUNT)?,
            ideal_cycle_time: self.number(COL_IDEAL_CYCLE_TIME)?,
            downtime_reason: self
                .cell(COL_DOWNTIME_REASON)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        };

        match record.invariant_violation() {
            Some(message) => Err(LoaderError::InvariantViolation {
                row: self.row,
                message,
            }),
            None => Ok(record),
        }
    }

    fn cell(&self, column: &str) -> Option<&str> {
        self.positions
            .get(column)
            .and_then(|&idx| self.values.get(idx))
            .map(|v| v.trim())
    }

    fn text(&self, column: &str) -> Result<&str, LoaderError> {
        match self.cell(column) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(LoaderError::MissingValue {
                row: self.row,
                column: column.to_string(),
            }),
        }
    }

    fn number(&self, column: &str) -> Result<f64, LoaderError> {
        let raw = self.text(column)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LoaderError::InvalidNumber {
                row: self.row,
                column: column.to_string(),
                value: raw.to_string(),
            })
    }

    /// Counts accept integral floats such as `380.0` written by spreadsheets.
    fn count(&self, column: &str) -> Result<u64, LoaderError> {
        let raw = self.text(column)?;
        if let Ok(v) = raw.parse::<u64>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
                Ok(v as u64)
            }
            _ => Err(LoaderError::InvalidCount {
                row: self.row,
                column: column.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn date(&self, column: &str) -> Result<NaiveDate, LoaderError> {
        let raw = self.text(column)?;
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(|dt| dt.date())
            })
            .ok_or_else(|| LoaderError::InvalidDate {
                row: self.row,
                column: column.to_string(),
                value: raw.to_string(),
            })
    }
}
