//! Record Filter Module
//! Machine / shift / date-range selection over the loaded records.

use super::record::ProductionRecord;
use chrono::NaiveDate;

/// Values available for filtering, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub machines: Vec<String>,
    pub shifts: Vec<String>,
    /// Distinct dates, ascending.
    pub dates: Vec<NaiveDate>,
}

impl FilterOptions {
    pub fn from_records(records: &[ProductionRecord]) -> Self {
        let mut options = Self::default();
        for r in records {
            if !options.machines.contains(&r.machine) {
                options.machines.push(r.machine.clone());
            }
            if !options.shifts.contains(&r.shift) {
                options.shifts.push(r.shift.clone());
            }
            options.dates.push(r.date);
        }
        options.dates.sort();
        options.dates.dedup();
        options
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Current filter selection. An empty machine or shift list selects nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub machines: Vec<String>,
    pub shifts: Vec<String>,
    /// Inclusive bounds; `None` leaves that side open.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    /// Select every machine, every shift and the full date range.
    pub fn select_all(options: &FilterOptions) -> Self {
        Self {
            machines: options.machines.clone(),
            shifts: options.shifts.clone(),
            start_date: options.first_date(),
            end_date: options.last_date(),
        }
    }

    pub fn matches(&self, record: &ProductionRecord) -> bool {
        self.machines.contains(&record.machine)
            && self.shifts.contains(&record.shift)
            && self.start_date.map_or(true, |start| record.date >= start)
            && self.end_date.map_or(true, |end| record.date <= end)
    }

    /// Records passing the filter, in their original order.
    pub fn apply(&self, records: &[ProductionRecord]) -> Vec<ProductionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn toggle_machine(&mut self, machine: &str) {
        Self::toggle(&mut self.machines, machine);
    }

    pub fn toggle_shift(&mut self, shift: &str) {
        Self::toggle(&mut self.shifts, shift);
    }

    fn toggle(selected: &mut Vec<String>, value: &str) {
        if let Some(pos) = selected.iter().position(|v| v == value) {
            selected.remove(pos);
        } else {
            selected.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::tests::record;

    fn sample() -> Vec<ProductionRecord> {
        vec![
            record("2024-01-03", "M2", "Night", 480.0, 10.0, 90, 100, None),
            record("2024-01-01", "M1", "Morning", 480.0, 20.0, 90, 100, None),
            record("2024-01-02", "M1", "Night", 480.0, 30.0, 90, 100, None),
        ]
    }

    #[test]
    fn test_options_keep_appearance_order_and_sort_dates() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.machines, vec!["M2", "M1"]);
        assert_eq!(options.shifts, vec!["Night", "Morning"]);
        assert_eq!(options.dates.len(), 3);
        assert_eq!(options.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(options.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn test_select_all_keeps_every_record() {
        let records = sample();
        let filter = RecordFilter::select_all(&FilterOptions::from_records(&records));
        assert_eq!(filter.apply(&records), records);
    }

    #[test]
    fn test_filter_by_machine_shift_and_dates() {
        let records = sample();
        let mut filter = RecordFilter::select_all(&FilterOptions::from_records(&records));

        filter.toggle_machine("M2");
        let filtered = filter.apply(&records);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.machine == "M1"));

        filter.toggle_shift("Morning");
        assert_eq!(filter.apply(&records).len(), 1);

        filter.toggle_shift("Morning");
        filter.start_date = NaiveDate::from_ymd_opt(2024, 1, 2);
        let filtered = filter.apply(&records);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].downtime, 30.0);
    }

    #[test]
    fn test_empty_selection_selects_nothing() {
        let records = sample();
        let filter = RecordFilter::default();
        assert!(filter.apply(&records).is_empty());
    }
}
