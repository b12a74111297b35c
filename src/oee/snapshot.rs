//! Everything the dashboard shows for one filtered record set.

use super::bucket::TimeBucket;
use super::calculator::{GroupBy, GroupResult, OeeCalculator};
use super::kpi::KpiSummary;
use super::pareto::{ParetoAnalyzer, ParetoEntry};
use super::trend::{TrendAnalyzer, TrendPoint, TrendStats};
use crate::data::ProductionRecord;
use tracing::debug;

/// Derived dashboard view. Rebuilt from scratch on every filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct OeeSnapshot {
    pub kpi: KpiSummary,
    pub bucket: TimeBucket,
    pub trend: Vec<TrendPoint>,
    pub trend_stats: Option<TrendStats>,
    pub pareto: Vec<ParetoEntry>,
    pub by_machine: Vec<GroupResult>,
    pub by_shift: Vec<GroupResult>,
}

impl OeeSnapshot {
    pub fn compute(records: &[ProductionRecord], bucket: TimeBucket, target: f64) -> Self {
        let trend = TrendAnalyzer::trend_over_time(records, bucket);
        let snapshot = Self {
            kpi: KpiSummary::compute(records, target),
            bucket,
            trend_stats: TrendAnalyzer::trend_stats(&trend),
            trend,
            pareto: ParetoAnalyzer::pareto_downtime(records),
            by_machine: OeeCalculator::compute_oee(records, GroupBy::machine()),
            by_shift: OeeCalculator::compute_oee(records, GroupBy::shift()),
        };

        debug!(
            records = records.len(),
            trend_points = snapshot.trend.len(),
            reasons = snapshot.pareto.len(),
            machines = snapshot.by_machine.len(),
            "recomputed OEE snapshot"
        );
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.kpi.record_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;
    use crate::oee::WORLD_CLASS_OEE;

    #[test]
    fn test_snapshot_sections() {
        let records = vec![
            record("2024-01-01", "M1", "Morning", 480.0, 60.0, 350, 380, Some("Breakdown")),
            record("2024-01-01", "M2", "Night", 480.0, 30.0, 400, 420, Some("Setup")),
            record("2024-01-02", "M1", "Night", 480.0, 0.0, 410, 420, None),
        ];

        let snapshot = OeeSnapshot::compute(&records, TimeBucket::Day, WORLD_CLASS_OEE);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.trend.len(), 2);
        assert_eq!(snapshot.pareto.len(), 2);
        assert_eq!(snapshot.by_machine.len(), 2);
        let shifts: Vec<String> = snapshot.by_shift.iter().map(|g| g.key.label()).collect();
        assert_eq!(shifts, vec!["Morning", "Night"]);
        assert_eq!(snapshot.kpi.record_count, 3);

        let again = OeeSnapshot::compute(&records, TimeBucket::Day, WORLD_CLASS_OEE);
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = OeeSnapshot::compute(&[], TimeBucket::Month, WORLD_CLASS_OEE);
        assert!(snapshot.is_empty());
        assert!(snapshot.trend.is_empty());
        assert!(snapshot.trend_stats.is_none());
    }
}
