//! OEE Calculator Module
//! Groups production records and derives Availability, Performance, Quality and OEE.

use super::bucket::TimeBucket;
use crate::data::ProductionRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Which record fields form the group key. All unset means one overall group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupBy {
    pub machine: bool,
    pub shift: bool,
    pub bucket: Option<TimeBucket>,
}

impl GroupBy {
    pub const OVERALL: GroupBy = GroupBy {
        machine: false,
        shift: false,
        bucket: None,
    };

    pub fn machine() -> Self {
        Self {
            machine: true,
            ..Self::OVERALL
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::OVERALL
        }
    }

    pub fn bucket(bucket: TimeBucket) -> Self {
        Self {
            bucket: Some(bucket),
            ..Self::OVERALL
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn key_for(&self, record: &ProductionRecord) -> GroupKey {
        GroupKey {
            bucket: self.bucket.map(|b| b.start_of(record.date)),
            machine: self.machine.then(|| record.machine.clone()),
            shift: self.shift.then(|| record.shift.clone()),
        }
    }
}

/// Group key values. Ordering is bucket (chronological), then machine, then shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub bucket: Option<NaiveDate>,
    pub machine: Option<String>,
    pub shift: Option<String>,
}

impl GroupKey {
    /// Human readable label, e.g. `CNC-01 / Morning`.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(date) = self.bucket {
            parts.push(date.format("%Y-%m-%d").to_string());
        }
        if let Some(machine) = &self.machine {
            parts.push(machine.clone());
        }
        if let Some(shift) = &self.shift {
            parts.push(shift.clone());
        }
        if parts.is_empty() {
            "All".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

/// Summed production figures of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductionTotals {
    pub records: usize,
    pub planned_time: f64,
    pub downtime: f64,
    pub ideal_run_time: f64,
    pub good_count: u64,
    pub total_count: u64,
}

impl ProductionTotals {
    pub fn from_records(records: &[ProductionRecord]) -> Self {
        let mut totals = Self::default();
        for r in records {
            totals.add(r);
        }
        totals
    }

    pub fn add(&mut self, record: &ProductionRecord) {
        self.records += 1;
        self.planned_time += record.planned_time;
        self.downtime += record.downtime;
        self.ideal_run_time += record.ideal_run_time();
        self.good_count = self.good_count.saturating_add(record.good_count);
        self.total_count = self.total_count.saturating_add(record.total_count);
    }

    pub fn run_time(&self) -> f64 {
        self.planned_time - self.downtime
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Availability,
    Performance,
    Quality,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Availability => "Availability",
            Metric::Performance => "Performance",
            Metric::Quality => "Quality",
        }
    }
}

/// A ratio that fell outside [0, 1] and was clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataQualityIssue {
    pub metric: Metric,
    pub raw_value: f64,
}

/// OEE components of one group. `None` means the ratio's denominator was zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OeeResult {
    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub quality: Option<f64>,
    pub oee: Option<f64>,
    pub totals: ProductionTotals,
    pub issues: Vec<DataQualityIssue>,
}

impl OeeResult {
    pub fn from_totals(totals: ProductionTotals) -> Self {
        let mut issues = Vec::new();

        let availability = Self::bounded(
            Metric::Availability,
            Self::ratio(totals.run_time(), totals.planned_time),
            &mut issues,
        );
        let performance = Self::bounded(
            Metric::Performance,
            Self::ratio(totals.ideal_run_time, totals.run_time()),
            &mut issues,
        );
        let quality = Self::bounded(
            Metric::Quality,
            Self::ratio(totals.good_count as f64, totals.total_count as f64),
            &mut issues,
        );

        let oee = match (availability, performance, quality) {
            (Some(a), Some(p), Some(q)) => Some(a * p * q),
            _ => None,
        };

        Self {
            availability,
            performance,
            quality,
            oee,
            totals,
            issues,
        }
    }

    pub fn from_records(records: &[ProductionRecord]) -> Self {
        Self::from_totals(ProductionTotals::from_records(records))
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Availability => self.availability,
            Metric::Performance => self.performance,
            Metric::Quality => self.quality,
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
        (denominator > 0.0).then(|| numerator / denominator)
    }

    fn bounded(
        metric: Metric,
        value: Option<f64>,
        issues: &mut Vec<DataQualityIssue>,
    ) -> Option<f64> {
        value.map(|v| {
            if (0.0..=1.0).contains(&v) {
                v
            } else {
                issues.push(DataQualityIssue {
                    metric,
                    raw_value: v,
                });
                v.clamp(0.0, 1.0)
            }
        })
    }
}

/// OEE of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub key: GroupKey,
    pub result: OeeResult,
}

/// Grouped OEE computation over record slices.
pub struct OeeCalculator;

impl OeeCalculator {
    /// Sum each group's figures and derive its OEE components.
    ///
    /// Groups come back in ascending key order. An empty record set yields no groups.
    pub fn compute_oee(records: &[ProductionRecord], group_by: GroupBy) -> Vec<GroupResult> {
        let mut groups: BTreeMap<GroupKey, ProductionTotals> = BTreeMap::new();
        for record in records {
            groups.entry(group_by.key_for(record)).or_default().add(record);
        }

        groups
            .into_iter()
            .map(|(key, totals)| {
                let result = OeeResult::from_totals(totals);
                for issue in &result.issues {
                    warn!(
                        group = %key.label(),
                        metric = issue.metric.label(),
                        raw_value = issue.raw_value,
                        "ratio out of range, clamped"
                    );
                }
                GroupResult { key, result }
            })
            .collect()
    }

    /// OEE over the whole record set.
    pub fn overall(records: &[ProductionRecord]) -> OeeResult {
        OeeResult::from_records(records)
    }
}
