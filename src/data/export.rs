//! Data Export Module
//! Writes production records back to CSV with the input schema.

use super::record::{
    ProductionRecord, COL_DATE, COL_DOWNTIME, COL_DOWNTIME_REASON, COL_GOOD_COUNT,
    COL_IDEAL_CYCLE_TIME, COL_MACHINE, COL_PLANNED_TIME, COL_SHIFT, COL_TOTAL_COUNT,
    DATE_FORMAT,
};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const FILTERED_FILE_NAME: &str = "oee_filtered.csv";
pub const TEMPLATE_FILE_NAME: &str = "oee_template.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build export table: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Writes record sets to CSV files.
pub struct DataExporter;

impl DataExporter {
    /// Build a DataFrame with the schema column order.
    pub fn to_dataframe(records: &[ProductionRecord]) -> Result<DataFrame, ExportError> {
        let dates: Vec<String> = records
            .iter()
            .map(|r| r.date.format(DATE_FORMAT).to_string())
            .collect();
        let machines: Vec<String> = records.iter().map(|r| r.machine.clone()).collect();
        let shifts: Vec<String> = records.iter().map(|r| r.shift.clone()).collect();
        let planned: Vec<f64> = records.iter().map(|r| r.planned_time).collect();
        let downtime: Vec<f64> = records.iter().map(|r| r.downtime).collect();
        let good: Vec<u64> = records.iter().map(|r| r.good_count).collect();
        let total: Vec<u64> = records.iter().map(|r| r.total_count).collect();
        let cycle: Vec<f64> = records.iter().map(|r| r.ideal_cycle_time).collect();
        let reasons: Vec<Option<String>> =
            records.iter().map(|r| r.downtime_reason.clone()).collect();

        let df = DataFrame::new(vec![
            Column::new(COL_DATE.into(), dates),
            Column::new(COL_MACHINE.into(), machines),
            Column::new(COL_SHIFT.into(), shifts),
            Column::new(COL_PLANNED_TIME.into(), planned),
            Column::new(COL_DOWNTIME.into(), downtime),
            Column::new(COL_GOOD_COUNT.into(), good),
            Column::new(COL_TOTAL_COUNT.into(), total),
            Column::new(COL_IDEAL_CYCLE_TIME.into(), cycle),
            Column::new(COL_DOWNTIME_REASON.into(), reasons),
        ])?;

        Ok(df)
    }

    /// Write records to a CSV file. Missing reasons become empty cells.
    pub fn write_csv(records: &[ProductionRecord], path: &Path) -> Result<(), ExportError> {
        let mut df = Self::to_dataframe(records)?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        info!(path = %path.display(), rows = records.len(), "exported records");
        Ok(())
    }

    /// Write the first `rows` records as a fill-in template.
    pub fn write_template(
        records: &[ProductionRecord],
        rows: usize,
        path: &Path,
    ) -> Result<(), ExportError> {
        let end = rows.min(records.len());
        Self::write_csv(&records[..end], path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::record;
    use crate::data::record::COLUMNS;
    use crate::data::DataLoader;
    use tempfile::tempdir;

    fn sample() -> Vec<ProductionRecord> {
        vec![
            record("2024-01-01", "M1", "Morning", 480.0, 60.0, 350, 380, Some("Breakdown")),
            record("2024-01-02", "M2", "Night", 450.5, 12.25, 400, 410, None),
            record("2024-01-03", "M1", "Night", 480.0, 0.0, 0, 0, Some("Setup")),
        ]
    }

    #[test]
    fn test_dataframe_has_schema_columns() {
        let df = DataExporter::to_dataframe(&sample()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, COLUMNS.to_vec());
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_export_then_reload_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILTERED_FILE_NAME);
        let records = sample();

        DataExporter::write_csv(&records, &path).unwrap();
        let reloaded = DataLoader::read_file(&path).unwrap();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_template_keeps_first_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(TEMPLATE_FILE_NAME);

        DataExporter::write_template(&sample(), 2, &path).unwrap();
        let reloaded = DataLoader::read_file(&path).unwrap();
        assert_eq!(reloaded, sample()[..2].to_vec());

        DataExporter::write_template(&sample(), 10, &path).unwrap();
        assert_eq!(DataLoader::read_file(&path).unwrap().len(), 3);
    }
}
