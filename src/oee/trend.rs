//! OEE Trend Module
//! Chronological OEE per time bucket and summary statistics over the trend.

use super::bucket::TimeBucket;
use super::calculator::{GroupBy, OeeCalculator, OeeResult};
use crate::data::ProductionRecord;
use chrono::NaiveDate;
use statrs::statistics::Statistics;

/// OEE of one time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub bucket_start: NaiveDate,
    pub result: OeeResult,
}

/// Spread of the defined OEE values of a trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendStats {
    pub points: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// OEE per bucket, oldest first.
    pub fn trend_over_time(records: &[ProductionRecord], bucket: TimeBucket) -> Vec<TrendPoint> {
        OeeCalculator::compute_oee(records, GroupBy::bucket(bucket))
            .into_iter()
            .filter_map(|group| {
                group.key.bucket.map(|bucket_start| TrendPoint {
                    bucket_start,
                    result: group.result,
                })
            })
            .collect()
    }

    /// Mean, sample standard deviation and range of the defined OEE values.
    ///
    /// Returns `None` when no bucket has a defined OEE.
    pub fn trend_stats(points: &[TrendPoint]) -> Option<TrendStats> {
        let values: Vec<f64> = points.iter().filter_map(|p| p.result.oee).collect();
        if values.is_empty() {
            return None;
        }

        let std_dev = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };

        Some(TrendStats {
            points: values.len(),
            mean: values.iter().mean(),
            std_dev,
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        })
    }
}
