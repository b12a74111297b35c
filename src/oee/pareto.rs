//! Downtime Pareto Module
//! Ranks downtime reasons by total minutes with cumulative share.

use crate::data::ProductionRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ParetoEntry {
    pub reason: String,
    pub minutes: f64,
    /// Running share of all ranked downtime, 0–100.
    pub cumulative_pct: f64,
}

pub struct ParetoAnalyzer;

impl ParetoAnalyzer {
    /// Downtime minutes per reason, largest first, ties by reason name.
    ///
    /// Rows without a reason or without downtime are left out.
    pub fn pareto_downtime(records: &[ProductionRecord]) -> Vec<ParetoEntry> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for r in records {
            if let Some(reason) = r.downtime_reason.as_deref() {
                if r.downtime > 0.0 {
                    *totals.entry(reason).or_insert(0.0) += r.downtime;
                }
            }
        }

        let mut entries: Vec<ParetoEntry> = totals
            .into_iter()
            .map(|(reason, minutes)| ParetoEntry {
                reason: reason.to_string(),
                minutes,
                cumulative_pct: 0.0,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.minutes
                .total_cmp(&a.minutes)
                .then_with(|| a.reason.cmp(&b.reason))
        });

        let grand_total: f64 = entries.iter().map(|e| e.minutes).sum();
        if grand_total > 0.0 {
            let mut running = 0.0;
            for entry in &mut entries {
                running += entry.minutes;
                entry.cumulative_pct = running / grand_total * 100.0;
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;

    #[test]
    fn test_sorted_descending_with_alphabetical_ties() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 30.0, 1, 1, Some("Setup")),
            record("2024-01-01", "M1", "B", 480.0, 50.0, 1, 1, Some("Breakdown")),
            record("2024-01-01", "M2", "A", 480.0, 30.0, 1, 1, Some("Changeover")),
            record("2024-01-02", "M2", "B", 480.0, 20.0, 1, 1, Some("Setup")),
            record("2024-01-02", "M1", "A", 480.0, 10.0, 1, 1, Some("Material")),
        ];

        let pareto = ParetoAnalyzer::pareto_downtime(&records);
        let order: Vec<(&str, f64)> = pareto
            .iter()
            .map(|e| (e.reason.as_str(), e.minutes))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Breakdown", 50.0),
                ("Setup", 50.0),
                ("Changeover", 30.0),
                ("Material", 10.0),
            ]
        );
    }

    #[test]
    fn test_cumulative_percentage_reaches_hundred() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 75.0, 1, 1, Some("Breakdown")),
            record("2024-01-01", "M1", "B", 480.0, 25.0, 1, 1, Some("Setup")),
        ];

        let pareto = ParetoAnalyzer::pareto_downtime(&records);
        assert_eq!(pareto[0].cumulative_pct, 75.0);
        assert_eq!(pareto[1].cumulative_pct, 100.0);
    }

    #[test]
    fn test_rows_without_reason_or_downtime_are_skipped() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 40.0, 1, 1, None),
            record("2024-01-01", "M1", "B", 480.0, 0.0, 1, 1, Some("None")),
        ];
        assert!(ParetoAnalyzer::pareto_downtime(&records).is_empty());
    }

    #[test]
    fn test_ordering_holds_for_many_reasons() {
        let records: Vec<ProductionRecord> = (0..40u64)
            .map(|i| {
                let reason = format!("R{}", i % 7);
                record(
                    "2024-01-01",
                    "M1",
                    "A",
                    480.0,
                    ((i * 17) % 23) as f64,
                    1,
                    1,
                    Some(reason.as_str()),
                )
            })
            .collect();

        let pareto = ParetoAnalyzer::pareto_downtime(&records);
        for pair in pareto.windows(2) {
            assert!(
                pair[0].minutes > pair[1].minutes
                    || (pair[0].minutes == pair[1].minutes && pair[0].reason < pair[1].reason)
            );
        }
    }
}
