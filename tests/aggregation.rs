//! End-to-end aggregation over a loaded CSV file.

use chrono::NaiveDate;
use oee_dashboard::data::DataLoader;
use oee_dashboard::logging;
use oee_dashboard::oee::{
    GroupBy, OeeCalculator, OeeSnapshot, ParetoAnalyzer, TimeBucket, TrendAnalyzer,
    WORLD_CLASS_OEE,
};
use std::io::Write;

const SAMPLE: &str = "\
date,machine,shift,planned_time,downtime,good_count,total_count,ideal_cycle_time,downtime_reason
2024-01-01,M1,A,480,60,350,380,1,Changeover
2024-01-01,M2,A,480,30,400,420,1,Jam
2024-01-02,M1,B,480,45,390,400,1,Jam
2024-01-02,M2,B,480,0,440,450,1,
2024-01-08,M1,A,480,90,300,320,1,Breakdown
";

fn load_sample() -> Vec<oee_dashboard::data::ProductionRecord> {
    logging::init_test();
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file.flush().unwrap();
    DataLoader::read_file(file.path()).unwrap()
}

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.map_or(false, |a| (a - expected).abs() < 1e-3)
}

#[test]
fn test_reference_row_from_file() {
    let records = load_sample();
    assert_eq!(records.len(), 5);

    let result = OeeCalculator::overall(&records[..1]);
    assert_eq!(result.availability, Some(0.875));
    assert!(close(result.performance, 0.905));
    assert!(close(result.quality, 0.921));
    assert!(close(result.oee, 0.729));
}

#[test]
fn test_group_by_machine_and_shift() {
    let records = load_sample();
    let groups = OeeCalculator::compute_oee(&records, GroupBy::machine().with_shift());

    let labels: Vec<String> = groups.iter().map(|g| g.key.label()).collect();
    assert_eq!(labels, vec!["M1 / A", "M1 / B", "M2 / A", "M2 / B"]);

    for group in &groups {
        for value in [
            group.result.availability,
            group.result.performance,
            group.result.quality,
            group.result.oee,
        ]
        .into_iter()
        .flatten()
        {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[test]
fn test_pareto_order_and_cumulative() {
    let records = load_sample();
    let pareto = ParetoAnalyzer::pareto_downtime(&records);

    let reasons: Vec<&str> = pareto.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(reasons, vec!["Breakdown", "Jam", "Changeover"]);
    assert_eq!(pareto[1].minutes, 75.0);
    assert!((pareto.last().unwrap().cumulative_pct - 100.0).abs() < 1e-9);
}

#[test]
fn test_weekly_trend_buckets() {
    let records = load_sample();
    let trend = TrendAnalyzer::trend_over_time(&records, TimeBucket::Week);

    let starts: Vec<NaiveDate> = trend.iter().map(|p| p.bucket_start).collect();
    assert_eq!(
        starts,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        ]
    );
}

#[test]
fn test_snapshot_is_idempotent() {
    let records = load_sample();
    let first = OeeSnapshot::compute(&records, TimeBucket::Day, WORLD_CLASS_OEE);
    let second = OeeSnapshot::compute(&records, TimeBucket::Day, WORLD_CLASS_OEE);

    assert_eq!(first.kpi.overall, second.kpi.overall);
    assert_eq!(first.pareto, second.pareto);
    assert_eq!(first.trend.len(), 3);
    assert_eq!(first.kpi.good_parts, 1880);
    assert_eq!(first.kpi.downtime_minutes, 225.0);
}
