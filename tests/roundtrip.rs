//! Filter, export and reload of production data.

use oee_dashboard::data::{
    DataExporter, DataLoader, FilterOptions, LoaderError, RecordFilter, TEMPLATE_FILE_NAME,
};
use oee_dashboard::logging;
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = "\
Date,Machine,Shift,Planned_Time,Downtime,Good_Count,Total_Count,Ideal_Cycle_Time,Downtime_Reason
2024-02-01,Press-1,Day,480,20,450,460,1,Setup
2024-02-01,Press-2,Night,480,0,470,470,1,
2024-02-02,Press-1,Night,480,35,430,445,1,Jam
2024-02-03,Press-2,Day,480,10,455,465,1,Setup
";

#[test]
fn test_filtered_export_reloads_identically() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.csv");
    fs::write(&input, SAMPLE).unwrap();

    let mut loader = DataLoader::new();
    let records = DataLoader::read_file(&input).unwrap();
    loader.set_records(input.clone(), records.clone());
    assert_eq!(records.len(), 4);
    assert_eq!(loader.file_name().as_deref(), Some("input.csv"));

    let options = FilterOptions::from_records(&records);
    assert_eq!(options.machines, vec!["Press-1", "Press-2"]);
    assert_eq!(options.shifts, vec!["Day", "Night"]);

    let mut filter = RecordFilter::select_all(&options);
    filter.toggle_shift("Day");
    let filtered = filter.apply(&records);
    assert_eq!(filtered.len(), 2);

    let output = dir.path().join("filtered.csv");
    DataExporter::write_csv(&filtered, &output).unwrap();
    let reloaded = DataLoader::read_file(&output).unwrap();

    assert_eq!(reloaded, filtered);
    assert_eq!(reloaded[0].downtime_reason, None);
}

#[test]
fn test_template_keeps_first_rows() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.csv");
    fs::write(&input, SAMPLE).unwrap();
    let records = DataLoader::read_file(&input).unwrap();

    let template = dir.path().join(TEMPLATE_FILE_NAME);
    DataExporter::write_template(&records, 2, &template).unwrap();

    let reloaded = DataLoader::read_file(&template).unwrap();
    assert_eq!(reloaded, records[..2].to_vec());
}

#[test]
fn test_rejected_upload_leaves_loader_untouched() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.csv");
    fs::write(&good, SAMPLE).unwrap();
    let bad = dir.path().join("bad.csv");
    fs::write(
        &bad,
        "date,machine,shift,planned_time,downtime,good_count,total_count,ideal_cycle_time\n\
         2024-02-01,Press-1,Day,480,20,470,460,1\n",
    )
    .unwrap();

    let mut loader = DataLoader::new();
    loader.set_records(good.clone(), DataLoader::read_file(&good).unwrap());

    let err = DataLoader::read_file(&bad).unwrap_err();
    assert!(matches!(err, LoaderError::InvariantViolation { row: 1, .. }));
    assert_eq!(loader.row_count(), 4);
    assert_eq!(loader.file_name().as_deref(), Some("good.csv"));
}
