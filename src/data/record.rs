//! Production Record Module
//! Typed production rows and the fixed column schema shared by loading and export.

use chrono::NaiveDate;

pub const COL_DATE: &str = "date";
pub const COL_MACHINE: &str = "machine";
pub const COL_SHIFT: &str = "shift";
pub const COL_PLANNED_TIME: &str = "planned_time";
pub const COL_DOWNTIME: &str = "downtime";
pub const COL_GOOD_COUNT: &str = "good_count";
pub const COL_TOTAL_COUNT: &str = "total_count";
pub const COL_IDEAL_CYCLE_TIME: &str = "ideal_cycle_time";
pub const COL_DOWNTIME_REASON: &str = "downtime_reason";

/// Column order used for export and templates.
pub const COLUMNS: [&str; 9] = [
    COL_DATE,
    COL_MACHINE,
    COL_SHIFT,
    COL_PLANNED_TIME,
    COL_DOWNTIME,
    COL_GOOD_COUNT,
    COL_TOTAL_COUNT,
    COL_IDEAL_CYCLE_TIME,
    COL_DOWNTIME_REASON,
];

/// Columns an uploaded file must contain. `downtime_reason` may be absent.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_DATE,
    COL_MACHINE,
    COL_SHIFT,
    COL_PLANNED_TIME,
    COL_DOWNTIME,
    COL_GOOD_COUNT,
    COL_TOTAL_COUNT,
    COL_IDEAL_CYCLE_TIME,
];

/// Date format written on export.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One production row: a machine running one shift on one day.
///
/// Times are in minutes; `ideal_cycle_time` is minutes per unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRecord {
    pub date: NaiveDate,
    pub machine: String,
    pub shift: String,
    pub planned_time: f64,
    pub downtime: f64,
    pub good_count: u64,
    pub total_count: u64,
    pub ideal_cycle_time: f64,
    pub downtime_reason: Option<String>,
}

impl ProductionRecord {
    /// Minutes the machine actually ran.
    pub fn run_time(&self) -> f64 {
        self.planned_time - self.downtime
    }

    /// Minutes the produced units would take at the ideal cycle time.
    pub fn ideal_run_time(&self) -> f64 {
        self.total_count as f64 * self.ideal_cycle_time
    }

    /// Describe the first violated record invariant, if any.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.downtime < 0.0 {
            return Some(format!("downtime {} is negative", self.downtime));
        }
        if self.planned_time < self.downtime {
            return Some(format!(
                "downtime {} exceeds planned time {}",
                self.downtime, self.planned_time
            ));
        }
        if self.good_count > self.total_count {
            return Some(format!(
                "good count {} exceeds total count {}",
                self.good_count, self.total_count
            ));
        }
        if self.ideal_cycle_time < 0.0 {
            return Some(format!(
                "ideal cycle time {} is negative",
                self.ideal_cycle_time
            ));
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Record builder shared by the unit tests of the crate.
    pub(crate) fn record(
        date: &str,
        machine: &str,
        shift: &str,
        planned: f64,
        downtime: f64,
        good: u64,
        total: u64,
        reason: Option<&str>,
    ) -> ProductionRecord {
        ProductionRecord {
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            machine: machine.to_string(),
            shift: shift.to_string(),
            planned_time: planned,
            downtime,
            good_count: good,
            total_count: total,
            ideal_cycle_time: 1.0,
            downtime_reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn test_run_time_and_ideal_run_time() {
        let r = record("2024-01-01", "M1", "A", 480.0, 60.0, 350, 380, None);
        assert_eq!(r.run_time(), 420.0);
        assert_eq!(r.ideal_run_time(), 380.0);
        assert!(r.invariant_violation().is_none());
    }

    #[test]
    fn test_invariant_violations() {
        let r = record("2024-01-01", "M1", "A", 30.0, 60.0, 10, 10, None);
        assert!(r.invariant_violation().unwrap().contains("exceeds planned time"));

        let r = record("2024-01-01", "M1", "A", 480.0, 0.0, 11, 10, None);
        assert!(r.invariant_violation().unwrap().contains("good count"));

        let r = record("2024-01-01", "M1", "A", 480.0, -1.0, 1, 10, None);
        assert!(r.invariant_violation().unwrap().contains("negative"));
    }
}
