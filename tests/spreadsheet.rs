//! Excel input goes through the same typing as CSV.

use chrono::NaiveDate;
use oee_dashboard::data::{DataLoader, FileFormat};
use oee_dashboard::logging;
use oee_dashboard::oee::OeeCalculator;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Same rows as the workbook fixture; the workbook also has a blank row 3.
const EQUIVALENT_CSV: &str = "\
date,machine,shift,planned_time,downtime,good_count,total_count,ideal_cycle_time,downtime_reason
2024-01-01,M1,A,480,60,350,380,1,Changeover
2024-01-02,M2,B,480,0,440,450,1.5,
2024-01-08,M1,A,480,90,300,320,1,Breakdown
";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_workbook_matches_equivalent_csv() {
    logging::init_test();
    let workbook = fixture("oee_sample.xlsx");
    assert_eq!(
        FileFormat::from_path(&workbook).unwrap(),
        FileFormat::Spreadsheet
    );

    let dir = tempdir().unwrap();
    let csv = dir.path().join("oee_sample.csv");
    fs::write(&csv, EQUIVALENT_CSV).unwrap();

    let from_workbook = DataLoader::read_file(&workbook).unwrap();
    let from_csv = DataLoader::read_file(&csv).unwrap();
    assert_eq!(from_workbook, from_csv);
}

#[test]
fn test_workbook_cells_are_typed() {
    let records = DataLoader::read_file(&fixture("oee_sample.xlsx")).unwrap();

    // Blank row skipped
    assert_eq!(records.len(), 3);

    // Date-formatted cells
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());

    // Numeric cells stored as floats
    assert_eq!(records[1].good_count, 440);
    assert_eq!(records[1].total_count, 450);
    assert_eq!(records[1].ideal_cycle_time, 1.5);

    // Padded headers and an empty reason cell
    assert_eq!(records[0].machine, "M1");
    assert_eq!(records[0].downtime_reason.as_deref(), Some("Changeover"));
    assert_eq!(records[1].downtime_reason, None);

    let totals = OeeCalculator::overall(&records).totals;
    assert_eq!(totals.good_count, 1090);
    assert_eq!(totals.downtime, 150.0);
}
