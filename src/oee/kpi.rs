//! KPI Summary Module
//! Headline figures of the filtered record set and the world-class benchmark.

use super::calculator::{OeeCalculator, OeeResult};
use crate::data::ProductionRecord;

/// World-class OEE benchmark.
pub const WORLD_CLASS_OEE: f64 = 0.85;

/// Gauge color band an OEE value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeBand {
    Critical,
    Fair,
    Good,
    WorldClass,
}

impl GaugeBand {
    pub const ALL: [GaugeBand; 4] = [
        GaugeBand::Critical,
        GaugeBand::Fair,
        GaugeBand::Good,
        GaugeBand::WorldClass,
    ];

    const FAIR_FROM: f64 = 0.50;
    const GOOD_FROM: f64 = 0.75;

    /// Band for `oee` when world class starts at `target`.
    pub fn for_value(oee: f64, target: f64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|band| oee >= band.range(target).0)
            .unwrap_or(GaugeBand::Critical)
    }

    /// Lower and upper bound of the band as fractions.
    ///
    /// The world-class band starts at `target`; the fixed edges below it are
    /// pulled down to the target when it is lower than them.
    pub fn range(&self, target: f64) -> (f64, f64) {
        let target = target.clamp(0.0, 1.0);
        let fair = Self::FAIR_FROM.min(target);
        let good = Self::GOOD_FROM.min(target);
        match self {
            GaugeBand::Critical => (0.0, fair),
            GaugeBand::Fair => (fair, good),
            GaugeBand::Good => (good, target),
            GaugeBand::WorldClass => (target, 1.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GaugeBand::Critical => "Critical",
            GaugeBand::Fair => "Fair",
            GaugeBand::Good => "Good",
            GaugeBand::WorldClass => "World Class",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    pub overall: OeeResult,
    pub good_parts: u64,
    pub downtime_minutes: f64,
    pub record_count: usize,
    pub target: f64,
}

impl KpiSummary {
    pub fn compute(records: &[ProductionRecord], target: f64) -> Self {
        let overall = OeeCalculator::overall(records);
        Self {
            good_parts: overall.totals.good_count,
            downtime_minutes: overall.totals.downtime,
            record_count: overall.totals.records,
            overall,
            target,
        }
    }

    /// OEE minus the target; positive means above benchmark.
    pub fn delta_vs_target(&self) -> Option<f64> {
        self.overall.oee.map(|oee| oee - self.target)
    }

    pub fn band(&self) -> Option<GaugeBand> {
        self.overall
            .oee
            .map(|oee| GaugeBand::for_value(oee, self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;

    #[test]
    fn test_gauge_bands() {
        let t = WORLD_CLASS_OEE;
        assert_eq!(GaugeBand::for_value(0.10, t), GaugeBand::Critical);
        assert_eq!(GaugeBand::for_value(0.50, t), GaugeBand::Fair);
        assert_eq!(GaugeBand::for_value(0.80, t), GaugeBand::Good);
        assert_eq!(GaugeBand::for_value(0.85, t), GaugeBand::WorldClass);
        assert_eq!(GaugeBand::for_value(1.0, t), GaugeBand::WorldClass);
        assert_eq!(GaugeBand::Good.range(t), (0.75, 0.85));
    }

    #[test]
    fn test_world_class_band_follows_target() {
        assert_eq!(GaugeBand::for_value(0.82, 0.80), GaugeBand::WorldClass);
        assert_eq!(GaugeBand::for_value(0.78, 0.80), GaugeBand::Good);
        assert_eq!(GaugeBand::Good.range(0.80), (0.75, 0.80));
        assert_eq!(GaugeBand::WorldClass.range(0.80), (0.80, 1.0));

        // Target below the fixed edges collapses the bands in between.
        assert_eq!(GaugeBand::Fair.range(0.40), (0.40, 0.40));
        assert_eq!(GaugeBand::for_value(0.45, 0.40), GaugeBand::WorldClass);
        assert_eq!(GaugeBand::for_value(0.30, 0.40), GaugeBand::Critical);

        let records = vec![record("2024-01-01", "M1", "A", 480.0, 0.0, 410, 480, None)];
        let kpi = KpiSummary::compute(&records, 0.80);
        assert!(kpi.delta_vs_target().unwrap() > 0.0);
        assert_eq!(kpi.band(), Some(GaugeBand::WorldClass));
        assert_eq!(KpiSummary::compute(&records, 0.90).band(), Some(GaugeBand::Good));
    }

    #[test]
    fn test_kpi_summary_totals() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 60.0, 350, 380, Some("Breakdown")),
            record("2024-01-01", "M2", "A", 480.0, 30.0, 400, 420, Some("Setup")),
        ];
        let kpi = KpiSummary::compute(&records, WORLD_CLASS_OEE);

        assert_eq!(kpi.good_parts, 750);
        assert_eq!(kpi.downtime_minutes, 90.0);
        assert_eq!(kpi.record_count, 2);
        let delta = kpi.delta_vs_target().unwrap();
        assert!((delta - (kpi.overall.oee.unwrap() - 0.85)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_set_has_no_oee() {
        let kpi = KpiSummary::compute(&[], WORLD_CLASS_OEE);
        assert_eq!(kpi.overall.oee, None);
        assert_eq!(kpi.delta_vs_target(), None);
        assert_eq!(kpi.band(), None);
        assert_eq!(kpi.good_parts, 0);
    }
}
