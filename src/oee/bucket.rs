//! Time buckets for trend aggregation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Trend period. Each bucket is keyed by its first day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    #[default]
    Day,
    /// ISO week, starting Monday.
    Week,
    Month,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 3] = [TimeBucket::Day, TimeBucket::Week, TimeBucket::Month];

    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeBucket::Day => date,
            TimeBucket::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            TimeBucket::Month => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
        }
    }

    /// Axis label for a bucket key.
    pub fn format_key(&self, start: NaiveDate) -> String {
        match self {
            TimeBucket::Day => start.format("%Y-%m-%d").to_string(),
            TimeBucket::Week => start.format("%G-W%V").to_string(),
            TimeBucket::Month => start.format("%Y-%m").to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Day => "Daily",
            TimeBucket::Week => "Weekly",
            TimeBucket::Month => "Monthly",
        }
    }
}
